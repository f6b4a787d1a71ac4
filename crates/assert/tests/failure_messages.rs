use contract_assert::{Assert, Describe, PathCache, Result, TypeLabel, Value};
use pretty_assertions::assert_eq;

type Check = fn() -> Result<()>;

struct Order {
    id: u32,
}

impl Describe for Order {
    fn label(&self) -> TypeLabel {
        TypeLabel::Named("shop::Order".to_string())
    }

    fn to_text(&self) -> Option<String> {
        Some(format!("order #{}", self.id))
    }

    fn unique_hash(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

fn orders(ids: &[u32]) -> Value {
    Value::list(ids.iter().map(|&id| Value::object(&Order { id })))
}

#[test]
fn valid_contracts_pass() {
    let checks: [(&str, Check); 4] = [
        ("generic", || {
            Assert::is_true(42 == 42)?;
            Assert::is_false(42 != 42)?;
            Assert::is_null(())?;
            Assert::not_null(42)?;
            Assert::same("a", "a")
        }),
        ("array", || {
            Assert::array(Value::map([("foo", "bar"), ("foo42", "baz")]))?
                .of("string")?
                .contains("baz")?
                .unique()?
                .not_empty()?
                .keys_exist(["foo", "foo42"])?
                .key_exists("foo")?
                .key_does_not_exist("hey")?;
            Assert::array(vec![42, 43])?
                .contains(42)?
                .indexed()?
                .keys_exist([0, 1])?;
            Assert::array(orders(&[1, 2]))?.of("Order")?.unique()?;
            Ok(())
        }),
        ("string", || {
            Assert::string("2000-01-01")?
                .matches_regex(r"^(?<year>\d{4})-(?<month>\d{2})-(?<day>\d{2})$")?
                .length_exactly(10)?;
            Assert::string_binary(Value::bytes(vec![0u8, 1, 2]))?.length_exactly(3)?;
            Ok(())
        }),
        ("numeric", || {
            Assert::numeric(42)?.positive()?.less_than(43)?;
            Assert::numeric(42.5)?
                .positive()?
                .greater_than(42)?
                .between(42.4, 43.1)?;
            Ok(())
        }),
    ];

    for (name, check) in checks {
        if let Err(err) = check() {
            panic!("{name}: unexpected failure: {err}");
        }
    }
}

#[test]
fn failing_contracts_explain_themselves() {
    let cases: [(Check, &str); 12] = [
        (
            || Assert::same(42, "42"),
            "\"42\" is not the same as 42. However, non-strict comparison says they are equal.",
        ),
        (
            || Assert::array(vec![1, 2])?.contains("1").map(drop),
            "Array [1, 2] does not contain value \"1\".",
        ),
        (
            || Assert::array(orders(&[7, 8, 7]))?.unique().map(drop),
            "Array contains non-unique values, at least this one: \
             shop::Order (__toString → \"order #7\"):7.",
        ),
        (
            || Assert::array(orders(&[1]))?.of("Invoice").map(drop),
            "Expected array of Invoice, found shop::Order (__toString → \"order #1\").",
        ),
        (
            || Assert::numeric(-5)?.zero_or_positive().map(drop),
            "Value -5 is negative.",
        ),
        (
            || Assert::numeric("12")?.between(1, 10).map(drop),
            "Value 12 is not between 1..10.",
        ),
        (
            || Assert::float(0.1)?.equals_to(0.2, 0.01).map(drop),
            "0.1 is not equal to 0.2 (epsilon = 0.01).",
        ),
        (
            || Assert::string("hello")?.message("{subject}!").starts_with("x").map(drop),
            "hello!",
        ),
        (
            || Assert::string("héllo")?.length_min(6).map(drop),
            "Expected at least 6 chars, the actual string contains 5.",
        ),
        (
            || Assert::string_8bit("héllo")?.length_max(5).map(drop),
            "Expected at most 5 chars, the actual string contains 6.",
        ),
        (
            || Assert::string_binary("abc")?.is_in(["abd"]).map(drop),
            "Value \"abc\" is not in [\"abd\"].",
        ),
        (|| Assert::array(Value::list(Vec::<Value>::new()))?.not_empty().map(drop), "Array is empty."),
    ];

    for (check, expected) in cases {
        let err = check().unwrap_err();
        assert!(err.is_failure(), "{err}");
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn misuse_is_an_internal_error() {
    let cases: [(Check, &str); 3] = [
        (
            || Assert::array(vec![1])?.of("NULL").map(drop),
            "[INTERNAL ERROR]: of(\"null\") is not allowed.",
        ),
        (
            || Assert::string("x")?.matches_regex("[").map(drop),
            "[INTERNAL ERROR]: RegEx \"[\" failed with error",
        ),
        (
            || Assert::array(vec![Value::resource("socket")])?.unique().map(drop),
            "[INTERNAL ERROR]: Array contains value which cannot be checked for uniqueness: \
             resource \"socket\".",
        ),
    ];

    for (check, expected) in cases {
        let err = check().unwrap_err();
        assert!(err.is_internal(), "{err}");
        assert!(err.to_string().starts_with(expected), "{err}");
    }
}

#[test]
fn json_documents_are_checked_with_dot_notation() {
    let cache = PathCache::new();
    let document = serde_json::json!({
        "db": { "host": "localhost", "port": 5432 },
        "tags": ["a", "b"]
    });

    Assert::array(document.clone())
        .unwrap()
        .dot_notated(&cache)
        .keys_exist(["db.host", "db.port", "tags.1"])
        .unwrap();

    let err = Assert::array(document)
        .unwrap()
        .dot_notated(&cache)
        .key_exists("db.user")
        .unwrap_err();
    assert!(err
        .to_string()
        .ends_with("doesn't contain \"db.user\" (using dot notation)."));
}
