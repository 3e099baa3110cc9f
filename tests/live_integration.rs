// Talks to the real catalog service. Run with `cargo test -- --ignored`.
// EQUAKE_BASE_URL / EQUAKE_TIMEOUT_SECS may be set in the environment or a `.env` file.

#[cfg(test)]
mod live_tests {
    use chrono::{Duration, Utc};
    use dotenvy::dotenv;
    use equake_rs::{
        EarthquakeFilter, Filter, FilterOptions, MagnitudeFilter, QuakeClient, QuakeConfig,
        TimeFilter,
    };

    fn setup_client() -> QuakeClient {
        dotenv().ok();
        let _ = env_logger::builder().is_test(true).try_init();
        let config = QuakeConfig::from_env().expect("invalid EQUAKE_* environment");
        QuakeClient::new(config).expect("failed to build client")
    }

    fn last_week_m4() -> EarthquakeFilter {
        let end = Utc::now();
        EarthquakeFilter::new(
            vec![
                Filter::from(TimeFilter::new(Some(end - Duration::days(7)), Some(end)).unwrap()),
                Filter::from(MagnitudeFilter::new(Some(4.0), None).unwrap()),
            ],
            FilterOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_count_and_get_agree() {
        let client = setup_client();
        let filter = last_week_m4();

        let total = client.count(&filter).await.expect("live count failed");
        let quakes = client
            .get_limited(&filter, 20)
            .await
            .expect("live get failed");

        assert!(quakes.len() as u64 <= total);
        assert!(quakes.iter().all(|q| q.magnitude() >= 4.0));
    }
}
