//! Capabilities the hosting page provides to the engine.

use core::cell::RefCell;
use std::rc::Rc;

use anyhow::{Error, anyhow};

/// Confirmation dialog.
pub trait Prompt {
    fn confirm(&self, message: &str) -> bool;
}

pub trait Clipboard {
    /// # Errors
    /// Returns an error when the host refuses the write.
    fn write_text(&self, text: &str) -> Result<(), Error>;
}

/// Persisted theme preference.
pub trait ThemeStore {
    fn load(&self) -> Option<String>;
    /// # Errors
    /// Returns an error when the preference cannot be stored.
    fn save(&self, theme: &str) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct HostServices {
    pub prompt: Rc<dyn Prompt>,
    pub clipboard: Rc<dyn Clipboard>,
    pub theme_store: Rc<dyn ThemeStore>,
}

impl HostServices {
    /// Accepting prompt, working clipboard, empty theme store.
    pub fn in_memory() -> Self {
        Self {
            prompt: Rc::new(StaticPrompt::new(true)),
            clipboard: Rc::new(MemoryClipboard::default()),
            theme_store: Rc::new(MemoryThemeStore::default()),
        }
    }
}

/// Answers every prompt the same way and remembers the questions.
#[derive(Debug)]
pub struct StaticPrompt {
    answer: bool,
    asked: RefCell<Vec<String>>,
}

impl StaticPrompt {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompt for StaticPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.asked.borrow_mut().push(message.to_owned());
        self.answer
    }
}

#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: RefCell<Vec<String>>,
    refuse: bool,
}

impl MemoryClipboard {
    /// A clipboard that rejects every write.
    pub fn refusing() -> Self {
        Self {
            writes: RefCell::new(Vec::new()),
            refuse: true,
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), Error> {
        if self.refuse {
            return Err(anyhow!("clipboard access denied"));
        }
        self.writes.borrow_mut().push(text.to_owned());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    theme: RefCell<Option<String>>,
}

impl MemoryThemeStore {
    pub fn with_theme(theme: &str) -> Self {
        Self {
            theme: RefCell::new(Some(theme.to_owned())),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Option<String> {
        self.theme.borrow().clone()
    }

    fn save(&self, theme: &str) -> Result<(), Error> {
        *self.theme.borrow_mut() = Some(theme.to_owned());
        Ok(())
    }
}
