
#[cfg(test)]
mod client_tests {
    use super::test_utils::shared::*;
    use chrono::{TimeZone, Utc};
    use equake_rs::{
        EarthquakeFilter, Filter, FilterOptions, MagnitudeFilter, PagerLevel, ParseError,
        QuakeError,
    };
    use serde_json::json;

    fn magnitude_filter() -> EarthquakeFilter {
        EarthquakeFilter::new(
            vec![Filter::from(MagnitudeFilter::new(Some(6.0), None).unwrap())],
            FilterOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_count_returns_service_count() {
        let client = setup_client(
            ScriptedTransport::default().respond(200, r#"{"count": 1234, "maxAllowed": 20000}"#),
        );
        let total = client
            .count(&magnitude_filter())
            .await
            .expect("count failed");
        assert_eq!(total, 1234);

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1, "count must issue exactly one request");
        assert_eq!(requests[0].path(), "/fdsnws/event/1/count");
        assert!(query_pairs(&requests[0])
            .contains(&("minmagnitude".to_string(), "6".to_string())));
    }

    #[tokio::test]
    async fn test_get_parses_features_in_service_order() {
        let body = collection_json(vec![
            feature_json("us7000a", 6.1),
            feature_json("us7000c", 7.3),
            feature_json("us7000b", 6.4),
        ]);
        let client = setup_client(ScriptedTransport::default().respond(200, body));

        let quakes = client
            .get(&magnitude_filter())
            .await
            .expect("get failed");
        let ids: Vec<&str> = quakes.iter().map(|q| q.id()).collect();
        assert_eq!(ids, ["us7000a", "us7000c", "us7000b"]);

        let first = &quakes[0];
        assert_eq!(first.magnitude(), 6.1);
        assert_eq!(first.longitude(), -71.5);
        assert_eq!(first.latitude(), -33.1);
        assert_eq!(first.depth_km(), 35.0);
        assert_eq!(first.place(), "10 km SW of Somewhere, Chile");
        assert_eq!(first.time(), Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        assert_eq!(first.updated(), Utc.timestamp_millis_opt(1_700_000_360_000).unwrap());
        assert_eq!(first.pager_level(), Some(PagerLevel::Orange));
        assert_eq!(first.intensity(), Some(6.2));
        assert_eq!(first.reports(), Some(120));
        assert!(first.metadata().tsunami);
        assert_eq!(first.metadata().mag_type.as_deref(), Some("mww"));
        assert_eq!(first.metadata().detail, None);
        assert!(first.to_string().starts_with("M 6.1 - 10 km SW of Somewhere, Chile"));
    }

    #[tokio::test]
    async fn test_missing_mag_fails_whole_parse() {
        let mut broken = feature_json("us7000b", 5.0);
        broken["properties"]
            .as_object_mut()
            .unwrap()
            .remove("mag");
        let body = collection_json(vec![feature_json("us7000a", 6.0), broken]);
        let client = setup_client(ScriptedTransport::default().respond(200, body));

        match client.get(&magnitude_filter()).await {
            Err(QuakeError::Parse(ParseError::MissingField { index, field })) => {
                assert_eq!(index, 1);
                assert_eq!(field, "mag");
            }
            other => panic!("expected missing 'mag' at index 1, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_null_optional_properties_parse_to_none() {
        let mut quiet = feature_json("nc123", 2.1);
        let props = quiet["properties"].as_object_mut().unwrap();
        for key in ["alert", "mmi", "felt", "cdi", "sig", "magType"] {
            props.insert(key.to_string(), json!(null));
        }
        props.insert("tsunami".to_string(), json!(0));
        let client = setup_client(
            ScriptedTransport::default().respond(200, collection_json(vec![quiet])),
        );

        let quakes = client.get(&EarthquakeFilter::default()).await.unwrap();
        assert_eq!(quakes.len(), 1);
        assert_eq!(quakes[0].pager_level(), None);
        assert_eq!(quakes[0].intensity(), None);
        assert_eq!(quakes[0].reports(), None);
        assert!(!quakes[0].metadata().tsunami);
    }

    #[tokio::test]
    async fn test_missing_depth_coordinate_is_named() {
        let mut shallow = feature_json("us1", 4.0);
        shallow["geometry"]["coordinates"] = json!([-71.5, -33.1]);
        let client = setup_client(
            ScriptedTransport::default().respond(200, collection_json(vec![shallow])),
        );
        match client.get(&EarthquakeFilter::default()).await {
            Err(QuakeError::Parse(ParseError::MissingField { index: 0, field })) => {
                assert_eq!(field, "depth")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_alert_is_invalid_field() {
        let mut odd = feature_json("us1", 4.0);
        odd["properties"]["alert"] = json!("purple");
        let client = setup_client(
            ScriptedTransport::default().respond(200, collection_json(vec![odd])),
        );
        assert!(matches!(
            client.get(&EarthquakeFilter::default()).await,
            Err(QuakeError::Parse(ParseError::InvalidField { field: "alert", .. }))
        ));
    }

    #[tokio::test]
    async fn test_http_error_becomes_service_error() {
        let client = setup_client(ScriptedTransport::default().respond(
            400,
            "Error 400: Bad Request\n\nmaxmagnitude must be greater than minmagnitude\n",
        ));
        match client.count(&magnitude_filter()).await {
            Err(QuakeError::ServiceError { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Error 400: Bad Request");
            }
            other => panic!("expected a service error, got {:?}", other),
        }
        assert_eq!(client.transport().requests().len(), 1, "no retry expected");
    }

    #[tokio::test]
    async fn test_transport_error_propagates_unchanged() {
        let client = setup_client(
            ScriptedTransport::default()
                .fail(QuakeError::InvalidUrl("connection refused".to_string()))
                .respond(200, r#"{"count": 1}"#),
        );
        match client.count(&EarthquakeFilter::default()).await {
            Err(QuakeError::InvalidUrl(message)) => assert_eq!(message, "connection refused"),
            other => panic!("expected the transport error, got {:?}", other),
        }
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_limit_never_reaches_network() {
        let client = setup_client(ScriptedTransport::default());
        assert!(matches!(
            client.get_limited(&EarthquakeFilter::default(), 0).await,
            Err(QuakeError::Validation(_))
        ));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_limited_sends_limit() {
        let client = setup_client(
            ScriptedTransport::default().respond(200, collection_json(vec![feature_json("us1", 6.0)])),
        );
        let quakes = client
            .get_limited(&magnitude_filter(), 10)
            .await
            .unwrap();
        assert_eq!(quakes.len(), 1);
        let requests = client.transport().requests();
        assert!(query_pairs(&requests[0]).contains(&("limit".to_string(), "10".to_string())));
    }
}
