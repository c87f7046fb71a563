//! Line-oriented console dialogue.
//!
//! [`Console`] prints messages and reads answers, and acts as the
//! [`Operator`] for connect-and-write. It is generic over its input and output
//! so sessions can be driven from memory in tests.

use std::io::{self, BufRead, Write};

use tracing::warn;

use bscan_core::{CharacteristicInfo, Operator, SendEvent};

use crate::style;

/// Console I/O for one session.
pub struct Console<R, W> {
    input: R,
    output: W,
    color: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console without colors.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            color: false,
        }
    }

    /// Enable or disable colored result lines.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Whether result lines are colored.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Print one line.
    pub fn say(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", line.as_ref())
    }

    /// Print `question` without a newline and read one line of input.
    ///
    /// The line terminator is stripped; other whitespace is kept. Returns
    /// `None` at end of input.
    pub fn prompt(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }

    /// Consume the console and return its output.
    pub fn into_output(self) -> W {
        self.output
    }

    fn emit(&mut self, line: String) {
        if let Err(e) = self.say(&line) {
            warn!("Failed to write to console: {}", e);
        }
    }
}

impl<R, W> Operator for Console<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn on_event(&mut self, event: &SendEvent) {
        let color = self.color;
        let line = match event {
            SendEvent::Connecting {
                identifier,
                attempt,
                ..
            } => format!("Connecting to {} (Attempt {})...", identifier, attempt),
            SendEvent::Connected { .. } => style::success("Connected successfully!", color),
            SendEvent::NotConnected { .. } => style::failure("Failed to connect.", color),
            SendEvent::WritableFound { uuid } => {
                format!("Found writable characteristic: {}", uuid)
            }
            SendEvent::NoWritableCharacteristic { .. } => {
                "No writable characteristic found automatically. Here are available characteristics:"
                    .to_string()
            }
            SendEvent::CharacteristicSelected { uuid } => {
                format!("Selected characteristic: {}", uuid)
            }
            SendEvent::AttemptTimedOut { attempt } => style::warning(
                &format!("Connection attempt {} timed out.", attempt),
                color,
            ),
            SendEvent::AttemptFailed { attempt, reason } => style::warning(
                &format!("Connection attempt {} failed: {}", attempt, reason),
                color,
            ),
            SendEvent::Retrying { .. } => "Retrying...".to_string(),
        };
        self.emit(line);
    }

    fn choose_characteristic(&mut self, characteristics: &[CharacteristicInfo]) -> Option<String> {
        for (i, characteristic) in characteristics.iter().enumerate() {
            self.emit(format!("{}: {}", i + 1, characteristic.uuid));
        }
        match self.prompt("Select a characteristic by entering its number: ") {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Failed to read characteristic selection: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bscan_core::CharProperties;
    use uuid::Uuid;

    use super::*;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn test_prompt_strips_line_terminator_only() {
        let mut console = console("  hello world \r\nnext\n");
        assert_eq!(
            console.prompt("Q: ").unwrap().as_deref(),
            Some("  hello world ")
        );
        assert_eq!(console.prompt("Q: ").unwrap().as_deref(), Some("next"));
        assert_eq!(console.prompt("Q: ").unwrap(), None);
        assert_eq!(output(console), "Q: Q: Q: ");
    }

    #[test]
    fn test_prompt_last_line_without_newline() {
        let mut console = console("PING");
        assert_eq!(console.prompt("> ").unwrap().as_deref(), Some("PING"));
    }

    #[test]
    fn test_event_messages() {
        let mut console = console("");
        let uuid = Uuid::parse_str("0000ffe1-0000-1000-8000-00805f9b34fb").unwrap();

        console.on_event(&SendEvent::Connecting {
            identifier: "AA:BB:CC:DD:EE:FF".to_string(),
            attempt: 2,
            max_attempts: 3,
        });
        console.on_event(&SendEvent::Connected { attempt: 2 });
        console.on_event(&SendEvent::WritableFound { uuid });
        console.on_event(&SendEvent::AttemptTimedOut { attempt: 1 });
        console.on_event(&SendEvent::AttemptFailed {
            attempt: 1,
            reason: "refused".to_string(),
        });
        console.on_event(&SendEvent::NotConnected { attempt: 1 });
        console.on_event(&SendEvent::Retrying { next_attempt: 2 });

        assert_eq!(
            output(console),
            "Connecting to AA:BB:CC:DD:EE:FF (Attempt 2)...\n\
             Connected successfully!\n\
             Found writable characteristic: 0000ffe1-0000-1000-8000-00805f9b34fb\n\
             Connection attempt 1 timed out.\n\
             Connection attempt 1 failed: refused\n\
             Failed to connect.\n\
             Retrying...\n"
        );
    }

    #[test]
    fn test_choose_characteristic_lists_and_prompts() {
        let mut console = console("2\n");
        let service = Uuid::parse_str("00001800-0000-1000-8000-00805f9b34fb").unwrap();
        let first = Uuid::parse_str("00002a00-0000-1000-8000-00805f9b34fb").unwrap();
        let second = Uuid::parse_str("00002a01-0000-1000-8000-00805f9b34fb").unwrap();
        let characteristics = vec![
            CharacteristicInfo::new(first, service, CharProperties::READ),
            CharacteristicInfo::new(second, service, CharProperties::NOTIFY),
        ];

        assert_eq!(
            console.choose_characteristic(&characteristics).as_deref(),
            Some("2")
        );
        assert_eq!(
            output(console),
            "1: 00002a00-0000-1000-8000-00805f9b34fb\n\
             2: 00002a01-0000-1000-8000-00805f9b34fb\n\
             Select a characteristic by entering its number: "
        );
    }

    #[test]
    fn test_choose_characteristic_at_end_of_input() {
        let mut console = console("");
        assert_eq!(console.choose_characteristic(&[]), None);
    }
}
