use mapback::{locate_reference, Error, SourceMap, SourceMapBuilder};

#[test]
fn serializes_the_delta_encoded_mapping_string() {
    let mut builder = SourceMapBuilder::new(Some("bundle.js"));
    let source = builder.add_source("src/a.ts");
    assert_eq!(source, 0);

    builder.add_mapping(0, source, 1, 1, None);
    builder.add_mapping(10, source, 2, 5, None);

    let map = builder.serialize(None).unwrap();
    assert_eq!(map.version, "3");
    assert_eq!(map.mappings, "AAAA,UACI");
    assert_eq!(map.sources, ["src/a.ts"]);
}

#[test]
fn insertion_order_does_not_change_the_output() {
    let mut forward = SourceMapBuilder::new(None);
    let source = forward.add_source("src/a.ts");
    forward.add_mapping(0, source, 1, 1, None);
    forward.add_mapping(10, source, 2, 5, None);

    let mut reversed = SourceMapBuilder::new(None);
    let source = reversed.add_source("src/a.ts");
    reversed.add_mapping(10, source, 2, 5, None);
    reversed.add_mapping(0, source, 1, 1, None);

    assert_eq!(
        forward.serialize(None).unwrap().mappings,
        reversed.serialize(None).unwrap().mappings
    );
}

#[test]
fn equal_offsets_keep_insertion_order() {
    let mut builder = SourceMapBuilder::new(None);
    let source = builder.add_source("src/a.ts");
    builder.add_mapping(4, source, 1, 1, None);
    builder.add_mapping(4, source, 1, 9, None);

    // an unstable sort could flip the two segments
    assert_eq!(builder.serialize(None).unwrap().mappings, "IAAA,AAAQ");
}

#[test]
fn serialize_is_repeatable() {
    let mut builder = SourceMapBuilder::new(None);
    let source = builder.add_source("src/a.ts");
    builder.add_mapping(3, source, 2, 2, None);
    builder.add_mapping(0, source, 1, 1, None);

    let first = builder.serialize(None).unwrap();
    let second = builder.serialize(None).unwrap();
    assert_eq!(first.mappings, second.mappings);
    assert_eq!(first.sources, second.sources);
}

#[test]
fn name_index_zero_is_a_real_reference() {
    let mut builder = SourceMapBuilder::new(None);
    let source = builder.add_source("src/a.ts");
    let name = builder.add_name("fn");
    assert_eq!(name, 0);
    builder.add_mapping(0, source, 1, 1, Some(name));

    // five fields: the zero name index must not be dropped
    assert_eq!(builder.serialize(None).unwrap().mappings, "AAAAA");

    let mut unnamed = SourceMapBuilder::new(None);
    let source = unnamed.add_source("src/a.ts");
    unnamed.add_name("fn");
    unnamed.add_mapping(0, source, 1, 1, None);
    assert_eq!(unnamed.serialize(None).unwrap().mappings, "AAAA");
}

#[test]
fn absent_names_leave_the_name_counter_alone() {
    let mut builder = SourceMapBuilder::new(None);
    let source = builder.add_source("src/a.ts");
    let first = builder.add_name("first");
    let second = builder.add_name("second");

    builder.add_mapping(0, source, 1, 1, Some(first));
    builder.add_mapping(4, source, 1, 1, None);
    builder.add_mapping(8, source, 1, 1, Some(second));

    // the last delta is 1: second (1) relative to first (0), not to the
    // unnamed record in between
    assert_eq!(builder.serialize(None).unwrap().mappings, "AAAAA,IAAA,IAAAC");
}

#[test]
fn sources_and_names_keep_duplicates() {
    let mut builder = SourceMapBuilder::new(None);
    assert_eq!(builder.add_source("a.ts"), 0);
    assert_eq!(builder.add_source("a.ts"), 1);
    assert_eq!(builder.add_name("x"), 0);
    assert_eq!(builder.add_name("x"), 1);

    let map = builder.serialize(None).unwrap();
    assert_eq!(map.sources, ["a.ts", "a.ts"]);
    assert_eq!(map.names, ["x", "x"]);
}

#[test]
fn serialize_rejects_dangling_source_references() {
    let mut builder = SourceMapBuilder::new(None);
    builder.add_mapping(0, 0, 1, 1, None);

    assert!(matches!(
        builder.serialize(None),
        Err(Error::IndexOutOfRange {
            kind: "source",
            index: 0,
            len: 0
        })
    ));
}

#[test]
fn serialize_rejects_dangling_name_references() {
    let mut builder = SourceMapBuilder::new(None);
    let source = builder.add_source("a.ts");
    builder.add_mapping(0, source, 1, 1, Some(3));

    assert!(matches!(
        builder.serialize(None),
        Err(Error::IndexOutOfRange {
            kind: "name",
            index: 3,
            len: 0
        })
    ));
}

#[test]
fn document_json_has_the_v3_shape() {
    let mut builder = SourceMapBuilder::new(Some("bundle.js"));
    builder.set_source_root("webpack://app");
    let source = builder.add_source("src/a.ts");
    builder.add_mapping(0, source, 1, 1, None);

    let map = builder.serialize(Some("let a = 1;")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&map.to_json()).unwrap();

    assert_eq!(value["version"], "3");
    assert_eq!(value["file"], "bundle.js");
    assert_eq!(value["sourceRoot"], "webpack://app");
    assert_eq!(value["sources"][0], "src/a.ts");
    assert_eq!(value["names"], serde_json::json!([]));
    assert_eq!(value["mappings"], "AAAA");
    assert_eq!(value["sourceContent"], "let a = 1;");
}

#[test]
fn optional_document_fields_are_omitted_when_unset() {
    let mut builder = SourceMapBuilder::new(None);
    let source = builder.add_source("src/a.ts");
    builder.add_mapping(0, source, 1, 1, None);

    let map = builder.serialize(None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&map.to_json()).unwrap();
    let object = value.as_object().unwrap();

    assert!(!object.contains_key("file"));
    assert!(!object.contains_key("sourceRoot"));
    assert!(!object.contains_key("sourceContent"));
}

#[test]
fn version_deserializes_from_number_or_string() {
    let numeric = r#"{"version":3,"sources":["a.ts"],"mappings":"AAAA"}"#;
    let map = SourceMap::from_json(numeric).unwrap();
    assert_eq!(map.version, "3");
    assert!(map.names.is_empty());

    let text = r#"{"version":"3","sources":["a.ts"],"mappings":"AAAA"}"#;
    assert_eq!(SourceMap::from_json(text).unwrap().version, "3");
}

#[test]
fn from_json_rejects_other_versions_and_garbage() {
    let wrong = r#"{"version":4,"sources":[],"mappings":""}"#;
    assert!(matches!(
        SourceMap::from_json(wrong),
        Err(Error::UnsupportedFormat)
    ));

    assert!(matches!(SourceMap::from_json("not json"), Err(Error::Json(_))));
}

#[test]
fn content_for_serves_single_and_per_source_content() {
    let single = r#"{"version":3,"sources":["a.ts","b.ts"],"mappings":"AAAA","sourceContent":"only one"}"#;
    let map = SourceMap::from_json(single).unwrap();
    assert_eq!(map.content_for(0), Some("only one"));
    assert_eq!(map.content_for(1), None);

    let many =
        r#"{"version":3,"sources":["a.ts","b.ts"],"mappings":"AAAA","sourceContent":["first",null]}"#;
    let map = SourceMap::from_json(many).unwrap();
    assert_eq!(map.content_for(0), Some("first"));
    assert_eq!(map.content_for(1), None);
    assert_eq!(map.content_for(9), None);

    let none = r#"{"version":3,"sources":["a.ts"],"mappings":"AAAA"}"#;
    assert_eq!(SourceMap::from_json(none).unwrap().content_for(0), None);
}

#[test]
fn comment_and_data_url_round_trip() {
    let mut builder = SourceMapBuilder::new(Some("bundle.js"));
    let source = builder.add_source("src/a.ts");
    builder.add_mapping(0, source, 1, 1, None);
    builder.add_mapping(10, source, 2, 5, None);
    let map = builder.serialize(None).unwrap();

    let comment = map.to_comment();
    assert!(comment.starts_with("//# sourceMappingURL=data:application/json;base64,"));

    let generated = format!("console.log(1);\n{}\n", comment);
    let url = locate_reference(&generated).unwrap();
    let restored = SourceMap::from_data_url(url).unwrap();

    assert_eq!(restored.mappings, map.mappings);
    assert_eq!(restored.sources, map.sources);
    assert_eq!(restored.file, map.file);
}

#[test]
fn data_url_variants_and_rejects() {
    let json = r#"{"version":"3","sources":["a.ts"],"names":[],"mappings":"AAAA"}"#;
    let encoded = {
        let mut builder = SourceMapBuilder::new(None);
        let source = builder.add_source("a.ts");
        builder.add_mapping(0, source, 1, 1, None);
        builder.serialize(None).unwrap().to_json()
    };
    assert_eq!(encoded, json);

    let with_charset = format!(
        "data:application/json;charset=utf-8;base64,{}",
        mapback::encoder::base64::encode(json.as_bytes())
    );
    assert_eq!(
        SourceMap::from_data_url(&with_charset).unwrap().mappings,
        "AAAA"
    );

    assert!(matches!(
        SourceMap::from_data_url("http://example.com/out.js.map"),
        Err(Error::UnsupportedFormat)
    ));
    assert!(matches!(
        SourceMap::from_data_url("data:text/plain;base64,aGk="),
        Err(Error::UnsupportedFormat)
    ));
}

#[test]
fn locates_the_last_reference_comment() {
    let source = "let a;\n//# sourceMappingURL=old.map\nlet b;\n//@ sourceMappingURL=new.map\n";
    assert_eq!(locate_reference(source), Some("new.map"));

    assert_eq!(locate_reference("no comments here"), None);
    assert_eq!(
        locate_reference("//# sourceMappingURL=bundle.js.map"),
        Some("bundle.js.map")
    );
}
