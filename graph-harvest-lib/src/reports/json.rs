use crate::error::HarvestError;
use serde::Serialize;
use std::io::Write;

/// Write `value` as two-space indented JSON followed by a newline.
///
/// Non-ASCII text is written verbatim rather than escaped.
pub fn write_pretty<W: Write, T: Serialize + ?Sized>(value: &T, mut writer: W) -> Result<(), HarvestError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_output_keeps_order_and_unicode() {
        let value = json!({"name": "Café Ünïcode", "fan_count": 12, "tags": ["a"]});
        let mut buf = Vec::new();
        write_pretty(&value, &mut buf).unwrap();

        insta::assert_snapshot!(String::from_utf8(buf).unwrap(), @r#"
        {
          "name": "Café Ünïcode",
          "fan_count": 12,
          "tags": [
            "a"
          ]
        }
        "#);
    }
}
