//! Test utilities for format round-trip testing
//!
//! Shared helpers so each format's tests check the round-trip guarantee the
//! same way.

use crate::Delft3dFormat;
use pretty_assertions::assert_eq;
use std::fmt::Debug;

/// Assert that `text` parses and exports back unchanged, and that the
/// exported text parses to the same document.
pub fn assert_round_trip<T>(text: &str)
where
    T: Delft3dFormat + PartialEq + Debug,
{
    let parsed = T::parse(text).expect("Test operation should succeed");
    let exported = parsed.export().expect("Test operation should succeed");
    assert_eq!(text, exported);

    let reparsed = T::parse(&exported).expect("Test operation should succeed");
    assert_eq!(parsed, reparsed);
    assert!(T::verify_round_trip(text).is_ok());
}

/// Export a document and parse it back
pub fn test_round_trip<T>(original: &T) -> Result<(), Box<dyn std::error::Error>>
where
    T: Delft3dFormat + PartialEq + Debug,
{
    let text = original.export()?;
    let parsed = T::parse(&text)?;

    if original != &parsed {
        return Err(format!(
            "Round-trip verification failed:\nOriginal: {:?}\nParsed: {:?}",
            original, parsed
        )
        .into());
    }

    Ok(())
}
