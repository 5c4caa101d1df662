//! In-memory media engine.
//!
//! Keeps the virtual filesystem in a map and emulates the stream-copy
//! invocations the command builder produces:
//! - `-i <in> ... <out>` copies `<in>` to `<out>`
//! - `-f concat ... -i <list> ... <out>` joins the files named in `<list>`
//!
//! Every call is recorded, and load, exec and delete failures can be
//! injected, so it doubles as the engine for tests and dry runs.

use std::collections::{BTreeMap, HashSet};

use super::errors::{EngineError, EngineResult};
use super::{validate_name, MediaEngine};

/// In-memory engine with call recording and failure injection.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    files: BTreeMap<String, Vec<u8>>,
    loaded: bool,
    load_failure: Option<String>,
    exec_failures: HashSet<String>,
    delete_failures: HashSet<String>,
    exec_log: Vec<Vec<String>>,
    write_log: Vec<String>,
    delete_log: Vec<String>,
}

impl MemoryEngine {
    /// Create an engine that loads successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine whose `load` fails with `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            load_failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Make any exec that reads `name` fail (builder pattern).
    pub fn fail_exec_on(mut self, name: impl Into<String>) -> Self {
        self.exec_failures.insert(name.into());
        self
    }

    /// Make deleting `name` fail (builder pattern).
    pub fn fail_delete_of(mut self, name: impl Into<String>) -> Self {
        self.delete_failures.insert(name.into());
        self
    }

    /// Argument vectors of every exec call, in order.
    pub fn exec_calls(&self) -> &[Vec<String>] {
        &self.exec_log
    }

    /// Names passed to `write_file`, in order.
    pub fn writes(&self) -> &[String] {
        &self.write_log
    }

    /// Names successfully deleted, in order.
    pub fn deletes(&self) -> &[String] {
        &self.delete_log
    }

    /// Names currently in the virtual filesystem.
    pub fn file_names(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    /// Whether `name` currently exists.
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn require_loaded(&self) -> EngineResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(EngineError::NotLoaded)
        }
    }

    fn missing(&self, name: &str) -> EngineError {
        EngineError::exec_failed(
            "memory",
            1,
            format!("{}: No such file or directory", name),
        )
    }

    fn concat(&self, list_name: &str) -> EngineResult<(Vec<String>, Vec<u8>)> {
        let list = self.files.get(list_name).ok_or_else(|| self.missing(list_name))?;
        let text = String::from_utf8_lossy(list);

        let mut members = Vec::new();
        let mut joined = Vec::new();
        for line in text.lines() {
            let Some(entry) = parse_list_line(line) else {
                continue;
            };
            let data = self.files.get(&entry).ok_or_else(|| self.missing(&entry))?;
            joined.extend_from_slice(data);
            members.push(entry);
        }
        Ok((members, joined))
    }
}

/// Parse one `file '<name>'` line of a concat list.
fn parse_list_line(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix("file ")?.trim();
    let quoted = rest.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(quoted.replace("'\\''", "'"))
}

impl MediaEngine for MemoryEngine {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&mut self) -> EngineResult<()> {
        if let Some(reason) = &self.load_failure {
            return Err(EngineError::unavailable(reason.clone()));
        }
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> EngineResult<()> {
        validate_name(name)?;
        self.require_loaded()?;
        self.write_log.push(name.to_string());
        self.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> EngineResult<Vec<u8>> {
        validate_name(name)?;
        self.require_loaded()?;
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::FileNotFound(name.to_string()))
    }

    fn exec(&mut self, args: &[String], on_line: &mut dyn FnMut(&str)) -> EngineResult<()> {
        self.require_loaded()?;
        self.exec_log.push(args.to_vec());

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .ok_or_else(|| EngineError::exec_failed("memory", 1, "no input given"))?;
        let output = args
            .last()
            .filter(|o| *o != input)
            .ok_or_else(|| EngineError::exec_failed("memory", 1, "no output given"))?;
        validate_name(output)?;

        let is_concat = args.windows(2).any(|w| w[0] == "-f" && w[1] == "concat");
        let read = if is_concat {
            self.concat(input).map(|(mut names, data)| {
                names.push(input.clone());
                (names, data)
            })
        } else {
            self.files
                .get(input)
                .cloned()
                .map(|data| (vec![input.clone()], data))
                .ok_or_else(|| self.missing(input))
        };
        let (read_names, data) = read.inspect_err(|e| on_line(&e.to_string()))?;
        on_line(&format!("Input #0, from '{}'", input));

        if let Some(name) = read_names.iter().find(|n| self.exec_failures.contains(*n)) {
            let message = format!("{}: Invalid data found when processing input", name);
            on_line(&message);
            return Err(EngineError::exec_failed("memory", 1, message));
        }

        on_line(&format!("Output #0, to '{}'", output));
        self.files.insert(output.clone(), data);
        Ok(())
    }

    fn delete_file(&mut self, name: &str) -> EngineResult<()> {
        validate_name(name)?;
        self.require_loaded()?;
        if self.delete_failures.contains(name) {
            return Err(EngineError::io(
                format!("deleting {}", name),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "injected failure"),
            ));
        }
        match self.files.remove(name) {
            Some(_) => {
                self.delete_log.push(name.to_string());
                Ok(())
            }
            None => Err(EngineError::FileNotFound(name.to_string())),
        }
    }
}
