use dron_core::expressions::{
    parse_reference, JsonPointer, PathSegment, Reference, ReferenceError, Segment, Selector,
    Template, TemplateError, ValuePath,
};
use serde_json::json;

fn step_ref(step_id: &str, selector: Selector) -> Reference {
    Reference::Step {
        step_id: step_id.to_string(),
        selector,
    }
}

#[test]
fn literal_text_has_no_placeholders() {
    let t = Template::parse("https://example.com/users?page=1").unwrap();
    assert!(t.is_resolved());
    assert_eq!(t.render(), "https://example.com/users?page=1");
    assert_eq!(
        t.segments(),
        &[Segment::Literal("https://example.com/users?page=1".into())]
    );
}

#[test]
fn whole_response_reference() {
    let t = Template::parse("{{login}}").unwrap();
    let p = t.placeholders().next().unwrap();
    assert_eq!(p.raw, "{{login}}");
    assert_eq!(p.reference, step_ref("login", Selector::Whole));
}

#[test]
fn dotted_and_bracketed_paths() {
    let r = parse_reference(r#"login.data.items[2]["x-token"]"#).unwrap();
    let Reference::Step { step_id, selector } = r else {
        panic!("expected step reference");
    };
    assert_eq!(step_id, "login");
    let Selector::Path(path) = selector else {
        panic!("expected path selector");
    };
    assert_eq!(
        path.segments(),
        &[
            PathSegment::Key("data".into()),
            PathSegment::Key("items".into()),
            PathSegment::Index(2),
            PathSegment::Key("x-token".into()),
        ]
    );
}

#[test]
fn single_quoted_keys_and_escapes() {
    let path = ValuePath::parse(r#"['a b']["say \"hi\""]"#).unwrap();
    assert_eq!(
        path.segments(),
        &[
            PathSegment::Key("a b".into()),
            PathSegment::Key("say \"hi\"".into()),
        ]
    );
}

#[test]
fn json_pointer_reference() {
    let r = parse_reference("login#/data/items/0/id").unwrap();
    assert_eq!(
        r,
        step_ref(
            "login",
            Selector::Pointer(JsonPointer::parse("/data/items/0/id").unwrap())
        )
    );
}

#[test]
fn param_reference() {
    let r = parse_reference("$params.base.url").unwrap();
    assert_eq!(
        r,
        Reference::Param {
            key: "base.url".into()
        }
    );
    assert_eq!(r.to_string(), "$params.base.url");
}

#[test]
fn whitespace_inside_braces_is_ignored() {
    let t = Template::parse("{{  login.token  }}").unwrap();
    let p = t.placeholders().next().unwrap();
    assert_eq!(p.raw, "{{  login.token  }}");
    assert_eq!(p.reference.to_string(), "login.token");
}

#[test]
fn literal_text_around_multiple_placeholders() {
    let t = Template::parse("https://{{$params.host}}/u/{{login.id}}/o/{{order.id}}?x=1").unwrap();
    let refs: Vec<String> = t.placeholders().map(|p| p.reference.to_string()).collect();
    assert_eq!(refs, vec!["$params.host", "login.id", "order.id"]);
    assert_eq!(t.segments().len(), 7);
    assert_eq!(t.render(), "https://{{$params.host}}/u/{{login.id}}/o/{{order.id}}?x=1");
}

#[test]
fn json_braces_stay_literal() {
    let body = r#"{"user":{"id":"{{login.id}}"},"tags":[{"a":1}]}"#;
    let t = Template::parse(body).unwrap();
    assert_eq!(t.placeholders().count(), 1);
    assert_eq!(t.render(), body);
}

#[test]
fn innermost_double_brace_opens_the_placeholder() {
    let t = Template::parse("{{{login.id}}}").unwrap();
    assert_eq!(
        t.segments()[0],
        Segment::Literal("{".into()),
    );
    assert_eq!(t.placeholders().next().unwrap().raw, "{{login.id}}");
}

#[test]
fn quoted_keys_may_contain_closing_braces() {
    let t = Template::parse(r#"x={{A["a}}b"]}}&y={{A['c\'}}']}}"#).unwrap();
    let raws: Vec<&str> = t.placeholders().map(|p| p.raw.as_str()).collect();
    assert_eq!(raws, vec![r#"{{A["a}}b"]}}"#, r#"{{A['c\'}}']}}"#]);

    let keys: Vec<Reference> = t.placeholders().map(|p| p.reference.clone()).collect();
    assert_eq!(
        keys[0],
        step_ref(
            "A",
            Selector::Path(ValuePath::parse(r#"["a}}b"]"#).unwrap())
        )
    );
    let Reference::Step {
        selector: Selector::Path(path),
        ..
    } = &keys[1]
    else {
        panic!("expected path selector");
    };
    assert_eq!(path.segments(), &[PathSegment::Key("c'}}".into())]);

    let doc = json!({"a}}b": 1});
    let Reference::Step {
        selector: Selector::Path(path),
        ..
    } = &keys[0]
    else {
        panic!("expected path selector");
    };
    assert_eq!(path.evaluate(&doc).unwrap(), &json!(1));
}

#[test]
fn unterminated_quoted_key_leaves_placeholder_unclosed() {
    let err = Template::parse(r#"{{A["a}}"#).unwrap_err();
    assert_eq!(err, TemplateError::UnclosedPlaceholder { offset: 0 });
}

#[test]
fn unclosed_placeholder_is_an_error() {
    let err = Template::parse("abc {{login.token").unwrap_err();
    assert_eq!(err, TemplateError::UnclosedPlaceholder { offset: 4 });
}

#[test]
fn invalid_placeholder_contents_are_errors() {
    for bad in ["{{}}", "{{ $env.HOME }}", "{{log in}}", "{{login.}}", "{{login#a}}", "{{login[x]}}"] {
        let err = Template::parse(bad).unwrap_err();
        assert!(
            matches!(err, TemplateError::InvalidPlaceholder { .. }),
            "{bad} should be rejected, got {err:?}"
        );
    }
    assert_eq!(parse_reference("$env.HOME"), Err(ReferenceError::UnknownRoot("$env.HOME".into())));
}

#[test]
fn substitute_resolves_in_place_and_merges_literals() {
    let mut t = Template::parse("Bearer {{login.token}}").unwrap();
    let n = t.substitute(|p| (p.reference.step_id() == Some("login")).then(|| "xyz".to_string()));
    assert_eq!(n, 1);
    assert!(t.is_resolved());
    assert_eq!(t.segments(), &[Segment::Literal("Bearer xyz".into())]);
    assert_eq!(t.source(), "Bearer {{login.token}}");
}

#[test]
fn substitute_is_idempotent_on_resolved_text() {
    let mut t = Template::parse("{{a.v}}").unwrap();
    t.substitute(|_| Some("{{b.v}}".to_string()));
    let once = t.render();
    assert_eq!(t.substitute(|_| Some("again".to_string())), 0);
    assert_eq!(t.render(), once);
    assert_eq!(once, "{{b.v}}");
}

#[test]
fn partial_resolution_keeps_other_placeholders() {
    let mut t = Template::parse("{{a.x}}-{{b.y}}").unwrap();
    t.substitute(|p| (p.reference.step_id() == Some("a")).then(|| "1".to_string()));
    assert!(!t.is_resolved());
    assert_eq!(t.render(), "1-{{b.y}}");
    t.substitute(|p| (p.reference.step_id() == Some("b")).then(|| "2".to_string()));
    assert_eq!(t.render(), "1-2");
}

#[test]
fn reset_restores_authored_text() {
    let mut t = Template::parse("id={{a.id}}").unwrap();
    t.substitute(|_| Some("7".into()));
    t.reset();
    assert_eq!(t.render(), "id={{a.id}}");
    assert!(!t.is_resolved());
}

#[test]
fn serializes_as_source_text() {
    let mut t = Template::parse("x{{a}}").unwrap();
    t.substitute(|_| Some("resolved".into()));
    assert_eq!(serde_json::to_value(&t).unwrap(), json!("x{{a}}"));
    let back: Template = serde_json::from_value(json!("x{{a}}")).unwrap();
    assert_eq!(back.render(), "x{{a}}");
    assert!(serde_json::from_value::<Template>(json!("{{oops")).is_err());
}

#[test]
fn path_evaluation_against_json() {
    let doc = json!({"data": {"items": [{"id": 5}, {"id": 6}], "x-token": "t"}});
    let p = ValuePath::parse(".data.items[1].id").unwrap();
    assert_eq!(p.evaluate(&doc).unwrap(), &json!(6));
    let p = ValuePath::parse(r#".data["x-token"]"#).unwrap();
    assert_eq!(p.evaluate(&doc).unwrap(), &json!("t"));
    let ptr = JsonPointer::parse("/data/items/0/id").unwrap();
    assert_eq!(ptr.evaluate(&doc), Some(&json!(5)));
    assert!(ValuePath::parse(".data.items[9]").unwrap().evaluate(&doc).is_err());
}
