//! Morphological tokenization with MeCab and the UniDic dictionaries.
//!
//! Each supported profile names one historical-Japanese UniDic variant,
//! installed as `{dic_root}/unidic-{profile}`.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::{Command, Stdio},
    thread,
};

use bookgram_config::TokenizerSettings;
use tracing::debug;

use crate::IndexError;

/// Profiles a document may be tokenized with.
pub const PROFILES: [&str; 11] = [
    "jodai",
    "chuko",
    "waka",
    "chusei-bungo",
    "chusei-kougo",
    "kinsei-bungo",
    "kinsei-edo",
    "kinsei-kamigata",
    "kindai-bungo",
    "qkana",
    "novel",
];

/// Features a full UniDic entry carries.
const FULL_ENTRY_FEATURES: usize = 27;

/// Feature columns kept from a full entry: POS levels 1-4 and the lemma.
const KEPT_FEATURES: [usize; 5] = [0, 1, 2, 3, 10];

/// Fails unless `profile` is a supported profile.
pub fn check_profile(profile: &str) -> Result<(), IndexError> {
    if PROFILES.contains(&profile) {
        Ok(())
    } else {
        Err(IndexError::UnknownProfile {
            profile: profile.to_string(),
        })
    }
}

/// Splits text into token keys.
pub trait MorphTokenizer: Send + Sync {
    /// Tokenizes `text` with dictionary `profile`.
    fn tokenize(&self, profile: &str, text: &str) -> Result<Vec<String>, IndexError>;
}

/// Runs the MeCab executable once per document.
#[derive(Debug, Clone)]
pub struct MecabCommand {
    /// Executable name or path.
    program: String,
    /// Directory holding `unidic-*` dictionaries.
    dic_root: PathBuf,
}

impl MecabCommand {
    /// Creates a tokenizer running `program` with dictionaries from `dic_root`.
    pub fn new(program: impl Into<String>, dic_root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dic_root: dic_root.into(),
        }
    }

    /// Creates a tokenizer from configuration.
    pub fn from_settings(settings: &TokenizerSettings) -> Self {
        Self::new(settings.program.clone(), settings.dic_root.clone())
    }
}

impl MorphTokenizer for MecabCommand {
    fn tokenize(&self, profile: &str, text: &str) -> Result<Vec<String>, IndexError> {
        check_profile(profile)?;
        let failed = |message: String| IndexError::Tokenizer {
            profile: profile.to_string(),
            message,
        };
        let dic = self.dic_root.join(format!("unidic-{profile}"));
        let mut child = Command::new(&self.program)
            .arg("-d")
            .arg(&dic)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("mecab not initialized: {}: {e}", self.program)))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| failed("stdin unavailable".into()))?;

        // Feed input while output is drained so neither pipe fills up.
        let output = thread::scope(|scope| {
            let feeder = scope.spawn(move || stdin.write_all(text.as_bytes()));
            let output = child.wait_with_output();
            let fed = feeder
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("input writer panicked")));
            output.and_then(|output| fed.map(|()| output))
        })
        .map_err(|e| failed(format!("mecab parse error: {e}")))?;

        if !output.status.success() {
            return Err(failed(format!(
                "mecab parse error: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let tokens = parse_output(&String::from_utf8_lossy(&output.stdout));
        debug!(profile, tokens = tokens.len(), "tokenized");
        Ok(tokens)
    }
}

/// Turns MeCab's default output into token keys, one per token line.
pub fn parse_output(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.is_empty() && *line != "EOS")
        .map(|line| match line.split_once('\t') {
            Some((surface, features)) => token_key(surface, features),
            None => line.to_string(),
        })
        .collect()
}

/// Key of one token: its surface, or selected features for full entries.
pub fn token_key(surface: &str, features: &str) -> String {
    let fields: Vec<&str> = features.split(',').collect();
    if fields.len() < FULL_ENTRY_FEATURES {
        return surface.to_string();
    }
    KEPT_FEATURES
        .iter()
        .map(|&at| fields[at])
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_entry(pos: &str, lemma: &str) -> String {
        let mut fields = vec!["*"; FULL_ENTRY_FEATURES];
        fields[0] = pos;
        fields[1] = "普通名詞";
        fields[2] = "一般";
        fields[10] = lemma;
        fields.join(",")
    }

    #[test]
    fn known_profiles_pass() {
        for profile in PROFILES {
            check_profile(profile).unwrap();
        }
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let err = check_profile("modern").unwrap_err();
        assert_eq!(err.to_string(), "unexpected mecab type: \"modern\"");
    }

    #[test]
    fn full_entries_become_feature_keys() {
        assert_eq!(token_key("花", &full_entry("名詞", "花")), "名詞:普通名詞:一般:*:花");
    }

    #[test]
    fn short_entries_keep_the_surface() {
        assert_eq!(token_key("ＡＢ", "名詞,固有名詞,*"), "ＡＢ");
    }

    #[test]
    fn output_skips_eos_and_blank_lines() {
        let output = format!("花\t{}\nを\t助詞,格助詞\nEOS\n\n", full_entry("名詞", "花"));
        assert_eq!(parse_output(&output), vec!["名詞:普通名詞:一般:*:花", "を"]);
    }

    #[test]
    fn profile_is_checked_before_running() {
        let mecab = MecabCommand::new("/nonexistent/mecab", "/nonexistent");
        assert!(matches!(
            mecab.tokenize("modern", "花"),
            Err(IndexError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn missing_program_is_a_tokenizer_error() {
        let mecab = MecabCommand::new("/nonexistent/mecab", "/nonexistent");
        let err = mecab.tokenize("waka", "花").unwrap_err();
        assert!(matches!(err, IndexError::Tokenizer { ref profile, .. } if profile == "waka"));
        assert!(err.to_string().contains("mecab not initialized"));
    }
}
