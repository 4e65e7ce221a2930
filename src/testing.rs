//! In-memory stand-ins for processes and the network.

use crate::command::Runner;
use crate::error::{Error, Result};
use crate::transport::Transport;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

type Effect = Box<dyn Fn(&[String])>;

/// Records command lines; answers from canned responses, defaulting to success with no output.
#[derive(Default)]
pub struct FakeRunner {
    binaries: HashMap<String, PathBuf>,
    responses: HashMap<String, (i32, String)>,
    effects: Vec<(String, Effect)>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    /// Makes `find(name)` succeed.
    pub fn binary(mut self, name: &str) -> Self {
        self.binaries
            .insert(name.to_string(), PathBuf::from("/fake/bin").join(name));
        self
    }

    pub fn respond(mut self, command: &str, code: i32, output: &str) -> Self {
        self.responses
            .insert(command.to_string(), (code, output.to_string()));
        self
    }

    /// Runs `effect` for every command line starting with `prefix`.
    pub fn on(mut self, prefix: &str, effect: impl Fn(&[String]) + 'static) -> Self {
        self.effects.push((prefix.to_string(), Box::new(effect)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn answer(&self, args: &[String]) -> (i32, String) {
        let line = args.join(" ");
        self.calls.borrow_mut().push(line.clone());
        for (prefix, effect) in &self.effects {
            if line.starts_with(prefix.as_str()) {
                effect(args);
            }
        }
        self.responses.get(&line).cloned().unwrap_or((0, String::new()))
    }
}

impl Runner for FakeRunner {
    fn run(&self, args: &[String], check: bool) -> Result<i32> {
        let (code, output) = self.answer(args);
        if check && code != 0 {
            return Err(Error::Execution {
                command: args.join(" "),
                code,
                output,
            });
        }
        Ok(code)
    }

    fn eval(&self, args: &[String]) -> Result<(i32, String)> {
        Ok(self.answer(args))
    }

    fn find(&self, name: &str) -> Option<PathBuf> {
        self.binaries.get(name).cloned()
    }
}

/// Serves fixed bodies by URL; anything else is a 404.
#[derive(Default)]
pub struct FakeTransport {
    bodies: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn serve(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.bodies.get(url).cloned().ok_or_else(|| Error::Transfer {
            url: url.to_string(),
            status: 404,
        })
    }
}
