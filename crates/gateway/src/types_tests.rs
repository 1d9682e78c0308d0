use super::*;

fn params(pairs: &[(&str, &str)]) -> SearchParams {
    SearchParams::from_pairs(pairs.iter().copied())
}

#[test]
fn resource_type_round_trips_wire_names() {
    for t in ResourceType::ALL {
        assert_eq!(t.as_str().parse::<ResourceType>(), Ok(t));
    }
    assert_eq!(ResourceType::allowed_list(), "character, issue, volume, story_arc");
}

#[test]
fn resource_type_is_a_closed_case_sensitive_set() {
    for raw in ["publisher", "Character", "story-arc", "", " issue"] {
        assert_eq!(
            raw.parse::<ResourceType>(),
            Err(GatewayError::InvalidResourceType),
            "expected {raw:?} to be rejected"
        );
    }
}

#[test]
fn defaults_apply_only_to_absent_parameters() {
    let request = SearchRequest::from_params(params(&[("query", "Batman")])).unwrap();
    assert_eq!(request.resource_type, ResourceType::Character);
    assert_eq!(request.page, PageNumber::FIRST);

    assert_eq!(
        SearchRequest::from_params(params(&[("query", "Batman"), ("type", "")])),
        Err(GatewayError::InvalidResourceType)
    );
    assert_eq!(
        SearchRequest::from_params(params(&[("query", "Batman"), ("page", "")])),
        Err(GatewayError::InvalidPage)
    );
}

#[test]
fn query_is_trimmed_and_must_not_be_blank() {
    let request = SearchRequest::from_params(params(&[("query", "  Batman \t")])).unwrap();
    assert_eq!(request.query.as_str(), "Batman");

    for raw in ["", "   ", "\n\t"] {
        assert_eq!(
            SearchRequest::from_params(params(&[("query", raw)])),
            Err(GatewayError::InvalidQuery(QueryProblem::Missing))
        );
    }
    assert_eq!(
        SearchRequest::from_params(SearchParams::default()),
        Err(GatewayError::InvalidQuery(QueryProblem::Missing))
    );
}

#[test]
fn query_length_limit_counts_characters() {
    let at_limit = "é".repeat(MAX_QUERY_CHARS);
    assert!(SearchQuery::parse(&at_limit).is_ok());

    let over = "a".repeat(MAX_QUERY_CHARS + 1);
    assert_eq!(
        SearchQuery::parse(&over),
        Err(GatewayError::InvalidQuery(QueryProblem::TooLong))
    );
}

#[test]
fn deserialized_query_is_validated_and_trimmed() {
    let query: SearchQuery = serde_json::from_str(r#""  Batman ""#).unwrap();
    assert_eq!(query.as_str(), "Batman");

    let blank = serde_json::from_str::<SearchQuery>(r#""   ""#).unwrap_err();
    assert!(blank.to_string().contains("query is required"), "{blank}");
}

#[test]
fn query_is_validated_before_type_and_page() {
    assert_eq!(
        SearchRequest::from_params(params(&[("query", ""), ("type", "publisher"), ("page", "0")])),
        Err(GatewayError::InvalidQuery(QueryProblem::Missing))
    );
    assert_eq!(
        SearchRequest::from_params(params(&[("query", "x"), ("type", "publisher"), ("page", "0")])),
        Err(GatewayError::InvalidResourceType)
    );
}

#[test]
fn repeated_parameters_fail_their_own_rule() {
    assert_eq!(
        SearchRequest::from_params(params(&[("query", "a"), ("query", "b")])),
        Err(GatewayError::InvalidQuery(QueryProblem::Missing))
    );
    assert_eq!(
        SearchRequest::from_params(params(&[("query", "a"), ("type", "issue"), ("type", "issue")])),
        Err(GatewayError::InvalidResourceType)
    );
    assert_eq!(
        SearchRequest::from_params(params(&[("query", "a"), ("page", "1"), ("page", "2")])),
        Err(GatewayError::InvalidPage)
    );
}

#[test]
fn unknown_parameters_are_ignored() {
    let request =
        SearchRequest::from_params(params(&[("query", "Flash"), ("limit", "500"), ("api_key", "x")]))
            .unwrap();
    assert_eq!(request.to_catalog_search().limit, PAGE_SIZE);
}

#[test]
fn catalog_search_carries_trimmed_text_type_and_offset() {
    let request = SearchRequest::from_params(params(&[
        ("query", " Dark Knight "),
        ("type", "story_arc"),
        ("page", "3"),
    ]))
    .unwrap();

    assert_eq!(
        request.to_catalog_search(),
        CatalogSearch {
            query: "Dark Knight".to_owned(),
            resources: ResourceType::StoryArc,
            limit: 20,
            offset: 40,
        }
    );
}

#[test]
fn search_response_serialises_with_contract_field_names() {
    let response = SearchResponse {
        results: vec![serde_json::json!({"id": 1})],
        total: 45,
        page: 1,
        limit: 20,
    };
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({"results": [{"id": 1}], "total": 45, "page": 1, "limit": 20})
    );
}
