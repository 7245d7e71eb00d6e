use crate::Error;

/// Parse a user-supplied answer into its cell contents.
///
/// The grammar is case-insensitive `A..Z` plus four meta-characters:
/// - `(` opens a rebus group whose characters accumulate into one cell
/// - `)` closes it; nesting and unbalanced parentheses are rejected
/// - `.` outside a group marks an unknown cell (empty string); inside a
///   group it is a literal
/// - whitespace is ignored anywhere
///
/// The result is the ordered cell sequence, one string per cell; unknown
/// cells are empty strings and rebus cells hold more than one character.
pub fn parse_answer(input: &str) -> Result<Vec<String>, Error> {
    let bad_answer = |reason: &str| Error::BadAnswer {
        reason: reason.to_string(),
    };

    let mut cells = Vec::new();
    let mut group: Option<String> = None;

    for char in input.chars() {
        let char = char.to_ascii_uppercase();

        match char {
            char if char.is_whitespace() => {}

            '(' if group.is_some() => return Err(bad_answer("rebus groups cannot nest")),
            '(' => group = Some(String::new()),

            ')' => match group.take() {
                Some(rebus) => cells.push(rebus),
                None => return Err(bad_answer("unbalanced ')'")),
            },

            '.' => match &mut group {
                Some(rebus) => rebus.push('.'),
                None => cells.push(String::new()),
            },

            'A'..='Z' => match &mut group {
                Some(rebus) => rebus.push(char),
                None => cells.push(char.to_string()),
            },

            char => {
                return Err(Error::BadAnswer {
                    reason: format!("unexpected character '{char}'"),
                });
            }
        }
    }

    if group.is_some() {
        return Err(bad_answer("unbalanced '('"));
    }

    if cells.is_empty() {
        return Err(bad_answer("empty answer"));
    }

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("ABCDE", &["A", "B", "C", "D", "E"])]
    #[case("abc de", &["A", "B", "C", "D", "E"])]
    #[case("....S", &["", "", "", "", "S"])]
    #[case("(RED) VELVET CAKE", &["RED", "V", "E", "L", "V", "E", "T", "C", "A", "K", "E"])]
    #[case("(J.LO)", &["J.LO"])]
    fn valid_answers(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_answer(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("(a")]
    #[case("a)")]
    #[case("((a))")]
    #[case("((a)")]
    #[case(")a")]
    #[case("a-b")]
    fn invalid_answers(#[case] input: &str) {
        let err = parse_answer(input).unwrap_err();

        assert!(matches!(err, Error::BadAnswer { .. }));
    }
}
