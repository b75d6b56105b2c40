use anyhow::Result;
use std::io::{BufRead, Write};

/// Read a streaming response line-by-line, echoing chunks to `echo` as they
/// arrive, and return the concatenated text.
pub fn read_stream_to_string<R, W, F>(reader: R, echo: &mut W, mut parse_line: F) -> Result<String>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> Result<Option<String>>,
{
    let mut out = String::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(chunk) = parse_line(line)? {
            out.push_str(&chunk);
            write!(echo, "{}", chunk)?;
            echo.flush()?;
        }
    }

    writeln!(echo)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn chunks_are_joined_and_echoed() {
        let input = Cursor::new("a:Hello\n\nskip\na:, world\n");
        let mut echo = Vec::new();

        let text = read_stream_to_string(input, &mut echo, |line| {
            Ok(line.strip_prefix("a:").map(str::to_string))
        })
        .unwrap();

        assert_eq!(text, "Hello, world");
        assert_eq!(String::from_utf8(echo).unwrap(), "Hello, world\n");
    }

    #[test]
    fn parse_errors_propagate() {
        let input = Cursor::new("bad\n");
        let mut echo = Vec::new();
        let result = read_stream_to_string(input, &mut echo, |_| Err(anyhow::anyhow!("boom")));
        assert!(result.is_err());
    }
}
