//! End-to-end grid scenarios over the in-memory driver
//!
//! Each test mounts a fake grid, then drives it only through
//! `TableInspector` the way a page object would.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use gridprobe::prelude::*;
use gridprobe::{sorted_values, wait_loaded, NO_RECORDS_TEXT};

fn referrals() -> TableHandle {
    TableHandle::material_table("followup-referrals", Selector::test_id("followup-referrals"))
}

fn referral_grid() -> MockGrid {
    MockGrid::new([
        "Client NamePress Enter to sort",
        "Referral AmountPress Enter to sort",
        "Due DatePress Enter to sort",
    ])
    .with_row(["smith, ann", "$10", "01/05/2024"])
    .with_row(["Jones, Bo", "$2", "03/01/2023"])
    .with_row(["adams, Cy", "$30", "12/12/2023"])
    .with_column_semantics(1, ComparisonSemantics::Numeric)
    .with_column_semantics(2, ComparisonSemantics::Date)
}

fn mounted(grid: MockGrid) -> (MockDriver, TableHandle) {
    let _ = init_tracing();
    let driver = MockDriver::new();
    let table = referrals();
    driver.mount_grid(&table, grid);
    (driver, table)
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_repeated_reads_are_identical() {
    let (driver, table) = mounted(referral_grid());
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let first = inspector.get_column_values(&table, 0, None).await;
    let second = inspector.get_column_values(&table, 0, None).await;
    assert_eq!(first, vec!["smith, ann", "Jones, Bo", "adams, Cy"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_headers_drop_sort_hint() {
    let (driver, table) = mounted(MockGrid::new(["Patient NamePress Enter to sort", "Status"]));
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let labels: Vec<String> = inspector
        .get_column_headers(&table)
        .await
        .into_iter()
        .map(|h| h.label)
        .collect();
    assert_eq!(labels, vec!["Patient Name", "Status"]);
}

#[tokio::test]
async fn test_empty_state_row_reads_as_empty() {
    let (driver, table) = mounted(MockGrid::new(["Client Name", "Due Date"]));
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    assert_eq!(
        driver
            .read_all_text(&table.row_cells(0))
            .await
            .unwrap(),
        vec![NO_RECORDS_TEXT.to_string()]
    );
    assert!(inspector.get_column_values(&table, 0, None).await.is_empty());
}

#[tokio::test]
async fn test_custom_empty_state_text() {
    let table = TableHandle::html_table("appointments", Selector::css("#appointments"))
        .with_empty_state_text("No appointments scheduled");
    let driver = MockDriver::new();
    driver.mount_grid(
        &table,
        MockGrid::new(["Start", "Provider"]).with_empty_text("No appointments scheduled"),
    );
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());
    assert!(inspector.get_column_values(&table, 1, None).await.is_empty());
}

#[tokio::test]
async fn test_max_rows_caps_read() {
    let grid = (1..=10).fold(MockGrid::new(["Id"]), |grid, n| grid.with_row([n.to_string()]));
    let (driver, table) = mounted(grid);
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let values = inspector.get_column_values(&table, 0, Some(3)).await;
    assert_eq!(values, vec!["1", "2", "3"]);
    assert_eq!(inspector.get_column_values(&table, 0, None).await.len(), 10);
}

// ============================================================================
// Sorting
// ============================================================================

#[tokio::test]
async fn test_lexical_column_sorts_both_ways() {
    let (driver, table) = mounted(referral_grid());
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let report = inspector
        .test_column_sorting(&table, 0, "Client Name", ComparisonSemantics::Lexical)
        .await
        .unwrap();

    assert!(report.passed());
    assert_eq!(
        report.ascending.as_ref().unwrap().observed_values,
        vec!["adams, Cy", "Jones, Bo", "smith, ann"]
    );
    assert_eq!(
        report.descending.as_ref().unwrap().observed_values,
        vec!["smith, ann", "Jones, Bo", "adams, Cy"]
    );
    assert_eq!(report.reset, ResetOutcome::Restored);
    assert!(report.warnings.is_empty());
    assert_eq!(report.ascending.unwrap().column_index, Some(0));
}

#[tokio::test]
async fn test_currency_column_sorts_numerically() {
    let (driver, table) = mounted(referral_grid());
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let report = inspector
        .test_column_sorting_by_name(&table, "Referral Amount", ComparisonSemantics::Numeric)
        .await
        .unwrap();

    assert_eq!(report.column_index, 1);
    assert_eq!(
        report.ascending.unwrap().observed_values,
        vec!["$2", "$10", "$30"]
    );
}

#[test]
fn test_currency_column_is_not_lexically_sorted() {
    let observed: Vec<String> = ["$2", "$10", "$30"].map(String::from).to_vec();
    let lexical = sorted_values(&observed, SortDirection::Ascending, ComparisonSemantics::Lexical);
    assert_eq!(lexical, vec!["$10", "$2", "$30"]);
}

#[tokio::test]
async fn test_due_date_column() {
    let (driver, table) = mounted(referral_grid());
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let report = inspector
        .test_column_sorting_by_name(&table, "Due Date", ComparisonSemantics::Date)
        .await
        .unwrap();

    assert_eq!(report.baseline, vec!["01/05/2024", "03/01/2023", "12/12/2023"]);
    assert_eq!(
        report.ascending.as_ref().unwrap().observed_values,
        vec!["03/01/2023", "12/12/2023", "01/05/2024"]
    );
    assert!(report.ascending.unwrap().is_sorted);
    assert_eq!(
        report.descending.unwrap().observed_values,
        vec!["01/05/2024", "12/12/2023", "03/01/2023"]
    );
    assert_eq!(driver.grid_clicks("followup-referrals"), 3);
}

#[tokio::test]
async fn test_grid_that_ignores_clicks_fails_ascending() {
    let grid = MockGrid::new(["Status"])
        .with_row(["Open"])
        .with_row(["Pending"])
        .with_row(["Closed"])
        .with_cycle(SortCycle::Ignore);
    let (driver, table) = mounted(grid);
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let err = inspector
        .test_column_sorting(&table, 0, "Status", ComparisonSemantics::Lexical)
        .await
        .unwrap_err();

    assert!(err.is_comparison_failure());
    match err {
        ProbeError::ComparisonFailure {
            column,
            direction,
            position,
            left,
            right,
            observed,
        } => {
            assert_eq!(column, "Status");
            assert_eq!(direction, SortDirection::Ascending);
            assert_eq!(position, 1);
            assert_eq!((left.as_str(), right.as_str()), ("Pending", "Closed"));
            assert_eq!(observed, vec!["Open", "Pending", "Closed"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(driver.grid_clicks("followup-referrals"), 1);
}

#[tokio::test]
async fn test_toggle_grid_reset_is_only_a_warning() {
    let grid = MockGrid::new(["Provider"])
        .with_row(["Nguyen"])
        .with_row(["Ortiz"])
        .with_row(["Baker"])
        .with_cycle(SortCycle::Toggle);
    let (driver, table) = mounted(grid);
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let report = inspector
        .test_column_sorting(&table, 0, "Provider", ComparisonSemantics::Lexical)
        .await
        .unwrap();

    assert!(report.passed());
    assert_eq!(
        report.reset,
        ResetOutcome::Differs {
            observed: vec!["Baker".into(), "Nguyen".into(), "Ortiz".into()]
        }
    );
    assert_eq!(report.warnings.len(), 1);
    assert!(report.summary().starts_with("PASS followup-referrals[0] 'Provider'"));
}

#[tokio::test]
async fn test_empty_grid_sorts_with_warnings() {
    let (driver, table) = mounted(MockGrid::new(["Client Name"]));
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let report = inspector
        .test_column_sorting(&table, 0, "Client Name", ComparisonSemantics::Lexical)
        .await
        .unwrap();

    assert!(report.passed());
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.reset, ResetOutcome::Restored);
}

// ============================================================================
// Loading indicator
// ============================================================================

#[tokio::test]
async fn test_waits_out_spinner_after_each_click() {
    let (driver, table) = mounted(referral_grid().with_spinner(3));
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());

    let report = inspector
        .test_column_sorting(&table, 2, "Due Date", ComparisonSemantics::Date)
        .await
        .unwrap();
    assert!(report.passed());
    assert!(!driver
        .is_visible(table.loading.as_ref().unwrap())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_stuck_spinner_does_not_abort() {
    let (driver, table) = mounted(referral_grid().with_spinner(100_000));
    let config = ProbeConfig::fast().with_stability_timeout(20);
    let inspector = TableInspector::with_config(&driver, config);

    inspector.click_column_header(&table, 0).await.unwrap();
    assert_eq!(
        inspector.get_column_values(&table, 0, None).await,
        vec!["adams, Cy", "Jones, Bo", "smith, ann"]
    );
}

// ============================================================================
// Page objects
// ============================================================================

#[tokio::test]
async fn test_page_object_supplies_grid_selectors() {
    let page = PageObjectBuilder::new()
        .with_name("client referrals")
        .with_url_pattern("/clients/:id/referrals")
        .with_grid(referrals())
        .with_ready_marker(Selector::text("Followup Referrals"))
        .with_load_timeout(100)
        .build();
    assert!(page.matches_url("https://emr.example.test/clients/17/referrals"));

    let (driver, _) = mounted(referral_grid());
    driver.set_texts(&Selector::text("Followup Referrals"), ["Followup Referrals"]);
    wait_loaded(&driver, &page, 5).await.unwrap();

    let table = page.grid("followup-referrals").unwrap();
    let inspector = TableInspector::with_config(&driver, ProbeConfig::fast());
    let report = inspector
        .test_column_sorting_by_name(table, "client name", ComparisonSemantics::Lexical)
        .await
        .unwrap();
    assert!(report.passed());

    let json = report.to_json().unwrap();
    assert!(json.contains("\"table\": \"followup-referrals\""));
}
