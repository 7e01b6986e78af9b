use search_dsl::{Builder, ErrorKind, QueryError, build, to_json};
use serde_json::{Value, json};

fn keys(doc: &Value) -> Vec<String> {
    doc.as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

// ============================================================================
// Section: Default context
// ============================================================================

#[test]
fn test_empty_build_is_wrapped_query() {
    let doc = build(|_| Ok(())).unwrap();
    assert_eq!(doc, json!({"query": {}}));
}

#[test]
fn test_root_field_is_wrapped_in_must() {
    let doc = build(|q| {
        q.field("x").is("y");
        Ok(())
    })
    .unwrap();

    assert_eq!(doc, json!({"query": {"bool": {"must": [{"term": {"x": "y"}}]}}}));
}

#[test]
fn test_each_root_field_gets_its_own_must_entry() {
    let doc = build(|q| {
        q.field("a").is(1);
        q.field("b").is(2);
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc,
        json!({"query": {"bool": {"must": [{"term": {"a": 1}}, {"term": {"b": 2}}]}}})
    );
}

#[test]
fn test_bare_root_field_leaves_empty_must_entry() {
    let doc = build(|q| {
        q.field("x");
        Ok(())
    })
    .unwrap();

    assert_eq!(doc, json!({"query": {"bool": {"must": [{}]}}}));
}

#[test]
fn test_non_default_builder_is_not_wrapped() {
    let mut builder = Builder::with_default_context(false);
    builder.field("x").is("y");

    assert!(!builder.is_default_context());
    assert_eq!(builder.finalize(), json!({"term": {"x": "y"}}));
}

#[test]
fn test_empty_non_default_builder() {
    let builder = Builder::with_default_context(false);
    assert_eq!(builder.finalize(), json!({}));
}

// ============================================================================
// Section: Boolean groups
// ============================================================================

#[test]
fn test_must_group() {
    let doc = build(|q| {
        q.must(|q| {
            q.field("x").is("y");
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(doc, json!({"query": {"bool": {"must": [{"term": {"x": "y"}}]}}}));
}

#[test]
fn test_must_not_group() {
    let doc = build(|q| {
        q.must_not(|q| {
            q.field("x").is("y");
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(doc, json!({"query": {"bool": {"must_not": [{"term": {"x": "y"}}]}}}));
}

#[test]
fn test_should_group() {
    let doc = build(|q| {
        q.should(|q| {
            q.field("x").is("y");
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(doc, json!({"query": {"bool": {"should": [{"term": {"x": "y"}}]}}}));
}

#[test]
fn test_sequential_groups_append_in_order() {
    let doc = build(|q| {
        q.must(|q| {
            q.field("x").is("y");
            Ok(())
        })?
        .must(|q| {
            q.field("m").is("n");
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc["query"]["bool"]["must"],
        json!([{"term": {"x": "y"}}, {"term": {"m": "n"}}])
    );
}

#[test]
fn test_sibling_fields_in_group_share_op_keys() {
    let doc = build(|q| {
        q.must(|q| {
            q.field("a").is(1);
            q.field("b").is(2);
            q.field("age").gte(18).lt(65);
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc["query"]["bool"]["must"][0],
        json!({"term": {"a": 1, "b": 2}, "range": {"age": {"gte": 18, "lt": 65}}})
    );
}

#[test]
fn test_sibling_terms_lists_concatenate() {
    let doc = build(|q| {
        q.should(|q| {
            q.field("tags").match_any(["a", "b"]);
            q.field("labels").match_all(["c"]);
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc["query"]["bool"]["should"][0],
        json!({"terms": [
            {"tags": ["a", "b"], "minimum_should_match": 1},
            {"labels": ["c"], "minimum_should_match": 1}
        ]})
    );
}

#[test]
fn test_nested_groups() {
    let doc = build(|q| {
        q.must(|q| {
            q.should(|q| {
                q.field("color").is("red");
                Ok(())
            })?;
            q.should(|q| {
                q.field("color").is("blue");
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc,
        json!({"query": {"bool": {"must": [
            {"bool": {"should": [{"term": {"color": "red"}}, {"term": {"color": "blue"}}]}}
        ]}}})
    );
}

// ============================================================================
// Section: Field conditions
// ============================================================================

#[test]
fn test_field_condition_proxies_at_root() {
    let doc = build(|q| {
        q.field("foo").must().be("hello");
        q.field("foo").must_not().be("is it me");
        q.field("foo").should().be("you're looking for");
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc,
        json!({"query": {"bool": {
            "must": [{"term": {"foo": "hello"}}],
            "must_not": [{"term": {"foo": "is it me"}}],
            "should": [{"term": {"foo": "you're looking for"}}]
        }}})
    );
}

#[test]
fn test_field_condition_inside_group_routes_locally() {
    let doc = build(|q| {
        q.must(|q| {
            q.field("status").is("open");
            q.field("owner").must_not_be().is("bot");
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc["query"]["bool"]["must"][0],
        json!({
            "term": {"status": "open"},
            "bool": {"must_not": [{"term": {"owner": "bot"}}]}
        })
    );
}

#[test]
fn test_field_payload_joins_existing_bool_group() {
    let doc = build(|q| {
        q.must(|q| {
            q.field("a").is(1);
            Ok(())
        })?;
        q.field("b").is(2);
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc["query"]["bool"]["must"],
        json!([{"term": {"a": 1}}, {"term": {"b": 2}}])
    );
}

// ============================================================================
// Section: query_string / multi_match
// ============================================================================

#[test]
fn test_query_string_keeps_allowed_options() {
    let doc = build(|q| {
        q.query_string("q", json!({"default_field": "foo"}))?;
        Ok(())
    })
    .unwrap();

    let clause = &doc["query"]["bool"]["must"][0]["query_string"];
    assert_eq!(clause, &json!({"default_field": "foo", "query": "q"}));
    assert_eq!(keys(clause), vec!["default_field", "query"]);
}

#[test]
fn test_query_string_without_options() {
    let doc = build(|q| {
        q.query_string("title:rust", Value::Null)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc,
        json!({"query": {"bool": {"must": [{"query_string": {"query": "title:rust"}}]}}})
    );
}

#[test]
fn test_query_string_text_overrides_query_option() {
    let mut builder = Builder::with_default_context(false);
    builder
        .query_string("new", json!({"query": "old", "boost": 2}))
        .unwrap();

    let doc = builder.finalize();
    assert_eq!(doc, json!({"query_string": {"query": "new", "boost": 2}}));
    assert_eq!(keys(&doc["query_string"]), vec!["query", "boost"]);
}

#[test]
fn test_query_string_rejects_unknown_option() {
    let result = build(|q| {
        q.query_string("q", json!({"bad_key": "v"}))?;
        Ok(())
    });

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err,
        QueryError::InvalidOption {
            clause: "query_string".into(),
            option: "bad_key".into(),
        }
    );
}

#[test]
fn test_query_string_rejects_non_object_options() {
    let mut builder = Builder::new();
    let err = builder.query_string("q", json!(["default_field"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[test]
fn test_multi_match_passes_options_through() {
    let doc = build(|q| {
        q.multi_match("rust", ["title", "body"], json!({"type": "best_fields", "anything": 1}))?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc,
        json!({"query": {"bool": {"must": [{"multi_match": {
            "type": "best_fields",
            "anything": 1,
            "query": "rust",
            "fields": ["title", "body"]
        }}]}}})
    );
}

#[test]
fn test_multi_match_in_group_is_not_rewrapped() {
    let doc = build(|q| {
        q.should(|q| {
            q.multi_match("rust", vec!["title".to_string()], Value::Null)?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc,
        json!({"query": {"bool": {"should": [
            {"multi_match": {"query": "rust", "fields": ["title"]}}
        ]}}})
    );
}

// ============================================================================
// Section: Sort
// ============================================================================

fn sorted(criteria: Value) -> Result<Value, QueryError> {
    build(|q| {
        q.sort("foo", criteria)?;
        Ok(())
    })
}

#[test]
fn test_sort_string_orders() {
    assert_eq!(sorted(json!("ASC")).unwrap()["sort"], json!([{"foo": {"order": "asc"}}]));
    assert_eq!(sorted(json!("desc")).unwrap()["sort"], json!([{"foo": {"order": "desc"}}]));
    assert_eq!(sorted(json!("Desc")).unwrap()["sort"], json!([{"foo": {"order": "desc"}}]));
}

#[test]
fn test_sort_integer_orders() {
    assert_eq!(sorted(json!(1)).unwrap()["sort"], json!([{"foo": {"order": "asc"}}]));
    assert_eq!(sorted(json!(-1)).unwrap()["sort"], json!([{"foo": {"order": "desc"}}]));
}

#[test]
fn test_sort_mapping_is_verbatim() {
    let doc = sorted(json!({"order": "desc", "mode": "avg"})).unwrap();
    assert_eq!(doc["sort"], json!([{"foo": {"order": "desc", "mode": "avg"}}]));
}

#[test]
fn test_sort_mapping_keeps_large_unsigned_exact() {
    let doc = sorted(json!({"missing": u64::MAX})).unwrap();
    assert_eq!(doc["sort"], json!([{"foo": {"missing": 18446744073709551615u64}}]));
    assert_eq!(
        to_json(&doc["sort"]),
        r#"[{"foo":{"missing":18446744073709551615}}]"#
    );
}

#[test]
fn test_term_keeps_large_unsigned_exact() {
    let doc = build(|q| {
        q.field("id").is(u64::MAX);
        Ok(())
    })
    .unwrap();

    assert_eq!(
        doc,
        json!({"query": {"bool": {"must": [{"term": {"id": 18446744073709551615u64}}]}}})
    );
}

#[test]
fn test_sort_rejects_invalid_values() {
    for criteria in [json!("up"), json!(0), json!(2), json!(1.0), json!(true), json!(null)] {
        let err = sorted(criteria.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage, "criteria {}", criteria);
    }
}

#[test]
fn test_sort_entries_keep_call_order_and_duplicates() {
    let doc = build(|q| {
        q.field("x").is("y");
        q.sort("a", "asc")?.sort("b", -1)?.sort("a", "asc")?;
        Ok(())
    })
    .unwrap();

    assert_eq!(keys(&doc), vec!["query", "sort"]);
    assert_eq!(
        doc["sort"],
        json!([
            {"a": {"order": "asc"}},
            {"b": {"order": "desc"}},
            {"a": {"order": "asc"}}
        ])
    );
}

#[test]
fn test_sort_is_dropped_outside_default_context() {
    let mut builder = Builder::with_default_context(false);
    builder.sort("a", "asc").unwrap();
    assert_eq!(builder.finalize(), json!({}));
}

// ============================================================================
// Section: Dynamic dispatch
// ============================================================================

#[test]
fn test_unknown_zero_argument_call_declares_field() {
    let doc = build(|q| {
        q.call("color", &[])?.is("red");
        Ok(())
    })
    .unwrap();

    assert_eq!(doc, json!({"query": {"bool": {"must": [{"term": {"color": "red"}}]}}}));
}

#[test]
fn test_unknown_call_with_arguments_is_unresolved() {
    let result = build(|q| {
        q.call("color", &[json!("red")])?;
        Ok(())
    });

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(
        err,
        QueryError::UnresolvedOperation {
            name: "color".into(),
            arity: 1,
        }
    );
}

#[test]
fn test_known_verb_cannot_be_dispatched_by_name() {
    let mut builder = Builder::new();
    let err = builder.call("must", &[]).unwrap_err();
    assert!(matches!(err, QueryError::Usage(_)));
}

// ============================================================================
// Section: Failure handling and determinism
// ============================================================================

#[test]
fn test_error_aborts_whole_build() {
    let result = build(|q| {
        q.field("x").is("y");
        q.must(|q| {
            q.sort("foo", "sideways")?;
            Ok(())
        })?;
        q.field("never").is("reached");
        Ok(())
    });

    assert!(result.is_err());
}

#[test]
fn test_same_calls_render_identically() {
    let run = || {
        build(|q| {
            q.query_string("rust", json!({"default_operator": "AND"}))?;
            q.must_not(|q| {
                q.field("state").any_of(["closed", "spam"]);
                Ok(())
            })?;
            q.aggregate(|a| {
                a.terms("author");
                Ok(())
            })?;
            q.sort("score", "desc")?;
            Ok(())
        })
        .unwrap()
    };

    assert_eq!(to_json(&run()), to_json(&run()));
}

#[test]
fn test_error_display() {
    let err = QueryError::InvalidOption {
        clause: "query_string".into(),
        option: "bad_key".into(),
    };
    assert_eq!(
        err.to_string(),
        "Validation error: 'bad_key' is not a valid query_string option"
    );
}
