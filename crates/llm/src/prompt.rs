use std::fmt::Write;

const INSTRUCTIONS: &str = "\
Extract **only the food items and their prices**. Ignore total, taxes, and extra info.
Return a JSON array like:
[{\"name\": \"Item Name\", \"price\": 123.45}]";

/// Render OCR lines into an extraction prompt.
pub fn build_prompt<S: AsRef<str>>(lines: &[S]) -> String {
    let mut prompt = String::from("Raw OCR Text Lines:\n");
    for line in lines {
        let line = line.as_ref().trim();
        if !line.is_empty() {
            // Writing to a String cannot fail.
            let _ = writeln!(prompt, "- {line}");
        }
    }
    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_each_line_as_bullet() {
        let prompt = build_prompt(&["Chitale", "Kaju Katli", "99.00"]);
        assert!(prompt.starts_with("Raw OCR Text Lines:\n- Chitale\n- Kaju Katli\n- 99.00\n"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn blank_lines_are_dropped() {
        let prompt = build_prompt(&["Tea", "   ", ""]);
        assert_eq!(prompt.matches("\n- ").count(), 1);
    }
}
