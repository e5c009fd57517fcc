//! Text checkpoint records.
//!
//! A record is one line:
//!
//! ```text
//! <hex value> <steps> <elapsed seconds> <max zero run>
//! ```
//!
//! The value is written most significant limb first, every limb padded to 16
//! hexadecimal digits, with no prefix or separators. Literal input files use
//! the same hexadecimal run on its own.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
    str::FromStr,
    time::Duration,
};

use common::path::CheckpointPaths;

use crate::{
    bignum::BigUnsigned,
    trajectory::ComputationState,
    utils::errors::{CheckpointError, FormatError},
};

impl ComputationState {
    pub fn encode_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "{:x} {} {} {}",
            self.value,
            self.steps,
            self.elapsed.as_secs_f64(),
            self.max_zero_run
        )
    }

    pub fn encode(&self) -> String {
        format!(
            "{:x} {} {} {}\n",
            self.value,
            self.steps,
            self.elapsed.as_secs_f64(),
            self.max_zero_run
        )
    }

    pub fn decode(text: &str) -> Result<Self, FormatError> {
        let (value, rest) = split_hex_run(text)?;
        let mut fields = rest.split_ascii_whitespace();

        let steps = parse_field(fields.next(), "step count")?;
        let seconds: f64 = parse_field(fields.next(), "elapsed seconds")?;
        let elapsed = Duration::try_from_secs_f64(seconds)
            .map_err(|_| FormatError::invalid_field("elapsed seconds", &seconds.to_string()))?;
        let max_zero_run = parse_field(fields.next(), "max zero run")?;

        if let Some(extra) = fields.next() {
            return Err(FormatError::trailing_content(extra));
        }

        Ok(Self {
            value,
            steps,
            max_zero_run,
            elapsed,
        })
    }

    /// Writes the record next to `path` and renames it into place, so a crash
    /// mid-write never replaces a good checkpoint with a truncated one.
    pub fn serialize_to_file(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let pending = CheckpointPaths::temp_path(path);
        let result = self
            .write_synced(&pending)
            .and_then(|()| fs::rename(&pending, path));
        if result.is_err() {
            let _ = fs::remove_file(&pending);
        }
        result
    }

    pub fn deserialize_from_file(path: &Path) -> Result<Self, CheckpointError> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::decode(&contents)?)
    }

    fn write_synced(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.encode_to(&mut writer)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

/// Parses a literal file body: a bare hexadecimal run and nothing else.
pub fn decode_literal(text: &str) -> Result<BigUnsigned, FormatError> {
    let (value, rest) = split_hex_run(text)?;
    match rest.trim() {
        "" => Ok(value),
        extra => Err(FormatError::trailing_content(extra)),
    }
}

pub fn load_literal(path: &Path) -> Result<BigUnsigned, CheckpointError> {
    let contents = fs::read_to_string(path)?;
    Ok(decode_literal(&contents)?)
}

/// Deletes the checkpoint at `path`; a missing file is not an error.
pub fn remove_checkpoint(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

fn split_hex_run(text: &str) -> Result<(BigUnsigned, &str), FormatError> {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(text.len());
    let (digits, rest) = text.split_at(end);
    Ok((BigUnsigned::from_hex_digits(digits)?, rest))
}

fn parse_field<T: FromStr>(field: Option<&str>, name: &'static str) -> Result<T, FormatError> {
    let raw = field.ok_or(FormatError::MissingField(name))?;
    raw.parse()
        .map_err(|_| FormatError::invalid_field(name, raw))
}

#[cfg(test)]
mod tests {
    use proptest::{collection::vec, prelude::*};
    use tempfile::tempdir;

    use super::*;

    fn sample_state() -> ComputationState {
        ComputationState {
            value: BigUnsigned::from_limbs(vec![0x1f, 0xabc]),
            steps: 1234,
            max_zero_run: 9,
            elapsed: Duration::from_millis(61_500),
        }
    }

    #[test]
    fn encodes_fixed_width_limbs_most_significant_first() {
        assert_eq!(
            sample_state().encode(),
            "0000000000000abc000000000000001f 1234 61.5 9\n"
        );
        assert_eq!(
            ComputationState::new(BigUnsigned::zero()).encode(),
            "0000000000000000 0 0 0\n"
        );
    }

    #[test]
    fn decodes_partial_leading_group() {
        let state = ComputationState::decode("abc000000000000001f 7 0.25 3").unwrap();
        assert_eq!(state.value.limbs(), &[0x1f, 0xabc]);
        assert_eq!(state.steps, 7);
        assert_eq!(state.elapsed, Duration::from_millis(250));
        assert_eq!(state.max_zero_run, 3);
    }

    #[test]
    fn rejects_malformed_records() {
        let cases = [
            ("", FormatError::MissingDigits),
            ("   \n", FormatError::MissingDigits),
            ("xyz 1 2 3", FormatError::MissingDigits),
            ("ff", FormatError::MissingField("step count")),
            ("ff 12", FormatError::MissingField("elapsed seconds")),
            ("ff 12 3.5", FormatError::MissingField("max zero run")),
        ];
        for (text, expected) in cases {
            assert_eq!(ComputationState::decode(text), Err(expected), "{text:?}");
        }

        for text in [
            "ff 12 3.5 x",
            "ff -1 3.5 2",
            "ff 12 -3.5 2",
            "ff 12 NaN 2",
            "ffz 12 3.5 2",
            "ff 12 3.5 2 extra",
        ] {
            assert!(ComputationState::decode(text).is_err(), "{text:?}");
        }
    }

    #[test]
    fn literal_mode_takes_a_bare_run() {
        assert_eq!(
            decode_literal("  1f\n").unwrap(),
            BigUnsigned::from_u64(31)
        );
        assert_eq!(
            decode_literal("1f 0 0 0"),
            Err(FormatError::TrailingContent("0 0 0".to_string()))
        );
        assert_eq!(decode_literal(""), Err(FormatError::MissingDigits));
    }

    proptest! {
        #[test]
        fn record_roundtrip(
            limbs in vec(any::<u64>(), 1..6),
            steps in any::<u64>(),
            max_zero_run in any::<u64>(),
            millis in 0u64..10_000_000_000,
        ) {
            let state = ComputationState {
                value: BigUnsigned::from_limbs(limbs),
                steps,
                max_zero_run,
                elapsed: Duration::from_millis(millis),
            };
            let text = state.encode();
            let decoded = ComputationState::decode(&text).unwrap();
            prop_assert_eq!(&decoded.value, &state.value);
            prop_assert_eq!(decoded.steps, state.steps);
            prop_assert_eq!(decoded.max_zero_run, state.max_zero_run);
        }
    }

    #[test]
    fn file_roundtrip_and_removal() {
        let dir = tempdir().unwrap();
        let path = CheckpointPaths::checkpoint_path(dir.path(), "-m127");
        let state = sample_state();

        state.serialize_to_file(&path).unwrap();
        assert!(!CheckpointPaths::temp_path(&path).exists());
        assert_eq!(ComputationState::deserialize_from_file(&path).unwrap(), state);

        let mut later = state.clone();
        later.steps += 10;
        later.serialize_to_file(&path).unwrap();
        assert_eq!(
            ComputationState::deserialize_from_file(&path).unwrap().steps,
            1244
        );

        remove_checkpoint(&path).unwrap();
        assert!(!path.exists());
        remove_checkpoint(&path).unwrap();
    }

    #[test]
    fn load_reports_missing_and_truncated_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.cache");
        assert!(matches!(
            ComputationState::deserialize_from_file(&path),
            Err(CheckpointError::Io(_))
        ));

        fs::write(&path, "0000000000000abc00000000").unwrap();
        assert!(matches!(
            ComputationState::deserialize_from_file(&path),
            Err(CheckpointError::Format(FormatError::MissingField("step count")))
        ));
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("-m127.cache");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        assert!(sample_state().serialize_to_file(&path).is_err());
        assert!(!CheckpointPaths::temp_path(&path).exists());
        assert!(path.join("occupied").exists());
    }

    #[test]
    fn failed_write_keeps_previous_checkpoint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("-m127.cache");
        let state = sample_state();
        state.serialize_to_file(&path).unwrap();

        let blocker = CheckpointPaths::temp_path(&path);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("occupied"), "x").unwrap();

        let mut later = state.clone();
        later.steps += 10;
        assert!(later.serialize_to_file(&path).is_err());
        assert_eq!(ComputationState::deserialize_from_file(&path).unwrap(), state);
    }
}
