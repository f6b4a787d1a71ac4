use contract_dump::Value;
use std::fmt;
use std::panic::Location;

/// How a frame's function was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    /// `Type::function(..)`
    Static,
    /// `value.method(..)`
    Instance,
    /// Free function
    None,
}

impl InvocationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "::",
            Self::Instance => ".",
            Self::None => "",
        }
    }
}

/// One captured call
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    function: String,
    file: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
    declaring_type: Option<String>,
    invocation_kind: Option<InvocationKind>,
    raw_arguments: Option<Vec<Value>>,
}

impl Frame {
    /// Frame without location information
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            file: None,
            line: None,
            column: None,
            declaring_type: None,
            invocation_kind: None,
            raw_arguments: None,
        }
    }

    /// Frame located at the caller of the enclosing `#[track_caller]` chain
    #[track_caller]
    pub fn here(
        function: impl Into<String>,
        declaring_type: impl Into<String>,
        kind: InvocationKind,
    ) -> Self {
        let location = Location::caller();
        Self::new(function)
            .at(location.file(), location.line(), location.column())
            .declared_by(declaring_type, kind)
    }

    /// Builder: set source position
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Builder: set declaring type and invocation kind
    #[must_use]
    pub fn declared_by(mut self, declaring_type: impl Into<String>, kind: InvocationKind) -> Self {
        self.declaring_type = Some(declaring_type.into());
        self.invocation_kind = Some(kind);
        self
    }

    /// Builder: attach the call's arguments
    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.raw_arguments = Some(arguments);
        self
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        self.line
    }

    #[must_use]
    pub const fn column(&self) -> Option<u32> {
        self.column
    }

    #[must_use]
    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    #[must_use]
    pub const fn invocation_kind(&self) -> Option<InvocationKind> {
        self.invocation_kind
    }

    #[must_use]
    pub fn raw_arguments(&self) -> Option<&[Value]> {
        self.raw_arguments.as_deref()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(declaring_type) = &self.declaring_type {
            let separator = self.invocation_kind.unwrap_or(InvocationKind::Static);
            write!(f, "{declaring_type}{}", separator.as_str())?;
        }
        write!(f, "{}", self.function)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " at {file}:{line}"),
            (Some(file), None) => write!(f, " at {file}"),
            _ => Ok(()),
        }
    }
}
