//! Interactive menu loop.
//!
//! Reads choices and note fields line by line and forwards them to the
//! [`Notebook`]. Store errors from an action are reported and the loop
//! continues; only a broken terminal ends it.

use bucketnotes_core::{BucketnotesError, Notebook, Result};
use log::warn;
use std::io::{BufRead, Write};

const MENU: &str =
    "Menu:\n\t1. Create and store new note\n\t2. Show note\n\t3. Notes list\n\t0. Exit\n";

/// Runs the menu until the user picks `0` or input ends.
///
/// # Errors
///
/// Returns [`BucketnotesError::Io`] if reading `input` or writing `out` fails.
pub fn run_menu<R: BufRead, W: Write>(
    notebook: &mut Notebook,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    write!(out, "{MENU}")?;

    loop {
        let Some(choice) = prompt(input, out, ">>> ")? else {
            break;
        };

        let outcome = match choice.trim() {
            "1" => create(notebook, input, out),
            "2" => show(notebook, input, out),
            "3" => list(notebook, out),
            "0" => break,
            _ => {
                writeln!(out, "Invalid input")?;
                Ok(())
            }
        };

        if let Err(e) = outcome {
            if let BucketnotesError::Io(_) = e {
                return Err(e);
            }
            warn!("event=menu_action status=error error={e}");
            writeln!(out, "Error: {}", e.user_message())?;
        }
    }

    out.flush()?;
    Ok(())
}

fn create<R: BufRead, W: Write>(notebook: &mut Notebook, input: &mut R, out: &mut W) -> Result<()> {
    let Some(title) = prompt(input, out, "Note title: ")? else {
        return Ok(());
    };
    let Some(content) = prompt(input, out, "Note content: ")? else {
        return Ok(());
    };
    let Some(author) = prompt(input, out, "Note written by: ")? else {
        return Ok(());
    };
    notebook.create_note(&title, &content, &author)
}

fn show<R: BufRead, W: Write>(notebook: &Notebook, input: &mut R, out: &mut W) -> Result<()> {
    let Some(title) = prompt(input, out, "Enter note's title: ")? else {
        return Ok(());
    };
    print_note(notebook, &title, out)
}

fn list<W: Write>(notebook: &Notebook, out: &mut W) -> Result<()> {
    writeln!(out, "Available notes:")?;
    for title in notebook.list_titles()? {
        writeln!(out, "\t{}", title?)?;
    }
    Ok(())
}

/// Prints one note, or a notice that there is none under `title`.
pub fn print_note<W: Write>(notebook: &Notebook, title: &str, out: &mut W) -> Result<()> {
    match notebook.read_note(title)? {
        Some(note) => writeln!(
            out,
            "Title: {title}\nNote: {}\nWritten by {} at {}",
            note.content, note.author, note.created_at
        )?,
        None => writeln!(out, "No note titled \"{title}\"")?,
    }
    Ok(())
}

/// Prints `label` and reads one line without its line ending.
///
/// Returns `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucketnotes_core::{Storage, StoreConfig, DEFAULT_BUSY_TIMEOUT};
    use std::io::Cursor;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn run_script(notebook: &mut Notebook, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run_menu(notebook, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn open(temp: &NamedTempFile) -> Notebook {
        Notebook::open(&StoreConfig::new(temp.path(), "alice")).unwrap()
    }

    #[test]
    fn create_show_and_list() {
        let temp = NamedTempFile::new().unwrap();
        let mut notebook = open(&temp);

        let output = run_script(
            &mut notebook,
            "1\ntodo\nbuy milk\nalice\n2\ntodo\n3\n0\n",
        );

        assert!(output.starts_with(MENU));
        assert!(output.contains("Title: todo\nNote: buy milk\nWritten by alice at "));
        assert!(output.contains("Available notes:\n\ttodo\n"));
    }

    #[test]
    fn unknown_choice_is_reported() {
        let temp = NamedTempFile::new().unwrap();
        let mut notebook = open(&temp);

        let output = run_script(&mut notebook, "7\n0\n");
        assert!(output.contains("Invalid input"));
    }

    #[test]
    fn missing_note_is_not_an_error() {
        let temp = NamedTempFile::new().unwrap();
        let mut notebook = open(&temp);

        let output = run_script(&mut notebook, "2\nnothing\n0\n");
        assert!(output.contains("No note titled \"nothing\""));
        assert!(!output.contains("Error:"));
    }

    #[test]
    fn recoverable_error_keeps_the_loop_running() {
        let temp = NamedTempFile::new().unwrap();
        let mut notebook = open(&temp);

        let output = run_script(&mut notebook, "1\n\nbody\nalice\n3\n0\n");
        assert!(output.contains("Error: Invalid title"));
        assert!(output.contains("Available notes:"));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let temp = NamedTempFile::new().unwrap();
        let mut notebook = open(&temp);

        let output = run_script(&mut notebook, "1\ntodo\n");
        assert!(output.ends_with("Note content: >>> "));
        assert!(notebook.read_note("todo").unwrap().is_none());
    }

    #[test]
    fn windows_line_endings_are_accepted() {
        let temp = NamedTempFile::new().unwrap();
        let mut notebook = open(&temp);

        run_script(&mut notebook, "1\r\ntodo\r\nbuy milk\r\nalice\r\n0\r\n");
        let note = notebook.read_note("todo").unwrap().unwrap();
        assert_eq!(note.content, "buy milk");
    }

    #[test]
    fn locked_store_is_reported_and_the_loop_continues() {
        let temp = NamedTempFile::new().unwrap();
        let config = StoreConfig::new(temp.path(), "alice")
            .with_busy_timeout(Duration::from_millis(50));
        let mut notebook = Notebook::open(&config).unwrap();

        let mut other = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT).unwrap();
        let lock = other.write_transaction().unwrap();

        let output = run_script(&mut notebook, "1\ntodo\nbuy milk\nalice\n3\n0\n");
        assert!(output.contains("Error: Note store is unavailable"));
        assert!(output.contains("Available notes:\n"));
        assert!(!output.contains("\ttodo"));

        drop(lock);
        notebook.create_note("todo", "buy milk", "alice").unwrap();
        assert!(notebook.read_note("todo").unwrap().is_some());
    }

    #[test]
    fn broken_output_ends_the_loop() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let temp = NamedTempFile::new().unwrap();
        let mut notebook = open(&temp);
        let mut input = Cursor::new(b"3\n0\n".to_vec());

        let result = run_menu(&mut notebook, &mut input, &mut Closed);
        assert!(matches!(result, Err(BucketnotesError::Io(_))));
    }
}
