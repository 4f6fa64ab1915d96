//! Extension hook points around the code block pass.

use std::borrow::Cow;
use std::fmt;

/// Trait for inspecting or rewriting document text at a hook point.
pub trait TextTransform: Send + Sync {
    /// Transform the input markdown text, returning an owned or borrowed string.
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

impl<F> TextTransform for F
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str> + Send + Sync,
{
    fn transform<'a>(&self, input: &'a str) -> Cow<'a, str> {
        (self)(input)
    }
}

/// Where a hook runs relative to the code block pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Immediately before fences are scanned.
    Before,
    /// Immediately after every fence has been replaced by its placeholder.
    After,
}

impl HookPoint {
    /// Event name, as registered by host extensions.
    pub fn name(self) -> &'static str {
        match self {
            HookPoint::Before => "githubCodeBlocks.before",
            HookPoint::After => "githubCodeBlocks.after",
        }
    }
}

/// Registered transforms for both hook points, run in registration order.
#[derive(Default)]
pub struct ExtensionHooks {
    before: Vec<Box<dyn TextTransform>>,
    after: Vec<Box<dyn TextTransform>>,
}

impl ExtensionHooks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transform at `point`.
    pub fn register<T: TextTransform + 'static>(&mut self, point: HookPoint, transform: T) {
        let list = match point {
            HookPoint::Before => &mut self.before,
            HookPoint::After => &mut self.after,
        };
        list.push(Box::new(transform));
    }

    /// Runs every transform registered at `point`.
    pub fn dispatch<'a>(&self, point: HookPoint, text: Cow<'a, str>) -> Cow<'a, str> {
        let list = match point {
            HookPoint::Before => &self.before,
            HookPoint::After => &self.after,
        };
        if !list.is_empty() {
            log::trace!("Dispatching {} to {} hook(s)", point.name(), list.len());
        }
        let mut current = text;
        for transform in list {
            let next = transform.transform(current.as_ref());
            current = Cow::Owned(next.into_owned());
        }
        current
    }
}

impl fmt::Debug for ExtensionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionHooks")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}
