//! Code stage: type a Java print statement with the secret phrase

/// Phrase the printed text must contain, normalized
pub const SOLUTION: &str = "hamsterilikeyou";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeVerdict {
    Accepted,
    /// No `System.out.print`/`println` call at all
    MissingPrint,
    /// Prints, but not the phrase
    WrongOutput,
}

impl CodeVerdict {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            CodeVerdict::Accepted => None,
            CodeVerdict::MissingPrint => {
                Some("Missing System.out.println or System.out.print statement!")
            }
            CodeVerdict::WrongOutput => Some("Print exactly: Hamster I Like You"),
        }
    }
}

/// Lowercase and drop whitespace, semicolons and quotes
fn normalize(src: &str) -> String {
    src.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ';' | '"' | '\''))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn check_code(src: &str, solution: &str) -> CodeVerdict {
    if !src.to_lowercase().contains("system.out.print") {
        return CodeVerdict::MissingPrint;
    }
    if normalize(src).contains(solution) {
        CodeVerdict::Accepted
    } else {
        CodeVerdict::WrongOutput
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_println_with_any_spacing() {
        let src = r#"System.out.println("Hamster I Like You");"#;
        assert_eq!(check_code(src, SOLUTION), CodeVerdict::Accepted);
        let src = "system.out.print( 'hamster   i like you' )";
        assert_eq!(check_code(src, SOLUTION), CodeVerdict::Accepted);
    }

    #[test]
    fn test_missing_print() {
        assert_eq!(check_code("Hamster I Like You", SOLUTION), CodeVerdict::MissingPrint);
        assert!(CodeVerdict::MissingPrint.message().is_some());
    }

    #[test]
    fn test_wrong_phrase() {
        let src = r#"System.out.println("Hello World");"#;
        assert_eq!(check_code(src, SOLUTION), CodeVerdict::WrongOutput);
        assert_eq!(CodeVerdict::Accepted.message(), None);
    }
}
