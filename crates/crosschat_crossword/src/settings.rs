use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which clue lists a channel's views should display
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueVisibility {
    #[default]
    All,
    None,
    #[serde(rename = "across")]
    AcrossOnly,
    #[serde(rename = "down")]
    DownOnly,
}

/// Font size the views render clues with
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    #[default]
    Normal,
    Large,
    XLarge,
}

/// Per-channel solve settings
///
/// Missing fields fall back to their defaults so settings rows written by
/// older versions keep loading.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Reject answers that would place an incorrect letter or disturb a
    /// correct one
    pub only_allow_correct_answers: bool,

    pub clues_to_show: ClueVisibility,

    pub clue_font_size: FontSize,

    /// Whether the puzzle's notepad is shown to solvers
    pub show_notes: bool,
}

impl Settings {
    /// Update one setting by its wire name from a JSON scalar.
    ///
    /// Unknown names and tokens outside an enum's symbol set are rejected.
    pub fn apply(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
        let bad_enum = |value: &serde_json::Value| Error::BadEnum {
            token: value.to_string(),
        };

        match name {
            "only_allow_correct_answers" => {
                self.only_allow_correct_answers =
                    serde_json::from_value(value.clone()).map_err(|_| bad_enum(&value))?;
            }
            "clues_to_show" => {
                self.clues_to_show =
                    serde_json::from_value(value.clone()).map_err(|_| bad_enum(&value))?;
            }
            "clue_font_size" => {
                self.clue_font_size =
                    serde_json::from_value(value.clone()).map_err(|_| bad_enum(&value))?;
            }
            "show_notes" => {
                self.show_notes =
                    serde_json::from_value(value.clone()).map_err(|_| bad_enum(&value))?;
            }
            name => {
                return Err(Error::BadEnum {
                    token: name.to_string(),
                });
            }
        }

        Ok(())
    }
}
