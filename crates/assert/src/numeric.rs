use crate::chain::{enter_call, failure, Template};
use crate::error::{AssertionContainsError, Result};
use contract_dump::{dump, Args, Value};
use contract_trace::InvocationKind;

/// Checks over a number (or numeric text) accepted by [`crate::Assert::numeric`]
#[derive(Debug, Clone)]
pub struct NumericAssertions {
    subject: Value,
    number: f64,
    template: Template,
}

impl NumericAssertions {
    pub const TYPE_NAME: &'static str = "contract_assert::NumericAssertions";

    pub(crate) fn new(subject: Value, number: f64) -> Self {
        Self {
            subject,
            number,
            template: Template::default(),
        }
    }

    /// Template used by every following check of this chain
    #[must_use]
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.template.set(template);
        self
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    #[track_caller]
    fn check(
        self,
        function: &'static str,
        passed: bool,
        default: &str,
        args: impl FnOnce() -> Args,
    ) -> Result<Self> {
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Instance, function);
        if passed {
            return Ok(self);
        }
        Err(failure(self.template.or(default), |_| {
            args().with("subject", self.subject.clone())
        }))
    }

    #[track_caller]
    pub fn zero_or_positive(self) -> Result<Self> {
        let passed = self.number >= 0.0;
        self.check("zero_or_positive", passed, "Value {subject} is negative.", Args::new)
    }

    #[track_caller]
    pub fn positive(self) -> Result<Self> {
        let passed = self.number > 0.0;
        self.check("positive", passed, "Value {subject} is not positive.", Args::new)
    }

    #[track_caller]
    pub fn negative(self) -> Result<Self> {
        let passed = self.number < 0.0;
        self.check("negative", passed, "Value {subject} is not negative.", Args::new)
    }

    /// Inclusive on both ends
    #[track_caller]
    pub fn between(self, from: impl Into<Value>, to: impl Into<Value>) -> Result<Self> {
        let (from, to) = (from.into(), to.into());
        let low = bound("between", &from)?;
        let high = bound("between", &to)?;
        let passed = self.number >= low && self.number <= high;
        self.check(
            "between",
            passed,
            "Value {subject} is not between {from}..{to}.",
            || Args::new().with("from", from).with("to", to),
        )
    }

    #[track_caller]
    pub fn greater_than(self, number: impl Into<Value>) -> Result<Self> {
        let number = number.into();
        let passed = self.number > bound("greater_than", &number)?;
        self.check(
            "greater_than",
            passed,
            "{subject} is not greater than {number}.",
            || Args::new().with("number", number),
        )
    }

    #[track_caller]
    pub fn greater_or_eq_than(self, number: impl Into<Value>) -> Result<Self> {
        let number = number.into();
        let passed = self.number >= bound("greater_or_eq_than", &number)?;
        self.check(
            "greater_or_eq_than",
            passed,
            "{subject} is not greater or equal than {number}.",
            || Args::new().with("number", number),
        )
    }

    #[track_caller]
    pub fn less_than(self, number: impl Into<Value>) -> Result<Self> {
        let number = number.into();
        let passed = self.number < bound("less_than", &number)?;
        self.check(
            "less_than",
            passed,
            "{subject} is not less than {number}.",
            || Args::new().with("number", number),
        )
    }

    #[track_caller]
    pub fn less_or_eq_than(self, number: impl Into<Value>) -> Result<Self> {
        let number = number.into();
        let passed = self.number <= bound("less_or_eq_than", &number)?;
        self.check(
            "less_or_eq_than",
            passed,
            "{subject} is not less or equal than {number}.",
            || Args::new().with("number", number),
        )
    }
}

fn bound(check: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        AssertionContainsError::new(format!(
            "{check}() expects a numeric bound, but {} provided.",
            dump(value)
        ))
        .into()
    })
}

/// Checks over a float accepted by [`crate::Assert::float`]
#[derive(Debug, Clone)]
pub struct FloatAssertions {
    subject: f64,
    template: Template,
}

impl FloatAssertions {
    pub const TYPE_NAME: &'static str = "contract_assert::FloatAssertions";

    pub(crate) fn new(subject: f64) -> Self {
        Self {
            subject,
            template: Template::default(),
        }
    }

    #[must_use]
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.template.set(template);
        self
    }

    pub const fn subject(&self) -> f64 {
        self.subject
    }

    /// `|subject - another| < epsilon`
    #[track_caller]
    pub fn equals_to(self, another: f64, epsilon: f64) -> Result<Self> {
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Instance, "equals_to");
        if (self.subject - another).abs() < epsilon {
            return Ok(self);
        }

        let template = self
            .template
            .or("{subject} is not equal to {number} (epsilon = {epsilon}).");
        Err(failure(template, |_| {
            Args::new()
                .with("subject", self.subject)
                .with("number", another)
                .with("epsilon", epsilon)
        }))
    }
}
