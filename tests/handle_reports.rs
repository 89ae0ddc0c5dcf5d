//! End-to-end GC handle report scenarios.

mod common;

use common::{capture_router, SyntheticHeap};
use heapscope::prelude::*;

fn handle(address: u64, kind: HandleKind, target: ObjectDescriptor) -> HandleDescriptor {
    HandleDescriptor {
        handle_address: address,
        kind,
        target,
        dependent_target: None,
    }
}

fn sample_heap() -> SyntheticHeap {
    SyntheticHeap::new()
        .with_named_type(0x10, "System.String")
        .with_named_type(0x20, "System.Byte[]")
        .with_handle(handle(
            0x7000,
            HandleKind::Strong,
            ObjectDescriptor::new(0x1000, Some(0x10), 24),
        ))
        .with_handle(handle(
            0x7008,
            HandleKind::Pinned,
            ObjectDescriptor::new(0x2000, Some(0x20), 4096),
        ))
        .with_handle(handle(
            0x7010,
            HandleKind::Strong,
            ObjectDescriptor::new(0x3000, Some(0x10), 32),
        ))
}

#[test]
fn listing_emits_kind_and_target_type() {
    let heap = sample_heap();
    let (router, capture) = capture_router();

    let outcome = GcHandleReportEngine::new(&heap)
        .with_format(OutputFormat::CommaDelimited)
        .run(&router, &CancellationToken::new())
        .unwrap();

    assert_eq!(outcome, ScanOutcome::Completed { rows_written: 3 });
    let contents = capture.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "Handle,Kind,Target,TargetType,Dependent");
    assert_eq!(
        lines[1],
        "0000000000007000,Strong,0000000000001000,System.String,"
    );
    assert_eq!(
        lines[2],
        "0000000000007008,Pinned,0000000000002000,System.Byte[],"
    );
}

#[test]
fn listing_shows_dependent_target_when_present() {
    let mut dependent = handle(
        0x7000,
        HandleKind::Dependent,
        ObjectDescriptor::new(0x1000, Some(0x10), 24),
    );
    dependent.dependent_target = Some(ObjectDescriptor::new(0x5000, Some(0x10), 16));

    let heap = SyntheticHeap::new()
        .with_named_type(0x10, "System.String")
        .with_handle(dependent);

    let (router, capture) = capture_router();
    GcHandleReportEngine::new(&heap)
        .with_format(OutputFormat::CommaDelimited)
        .run(&router, &CancellationToken::new())
        .unwrap();

    let contents = capture.contents();
    let row = contents.lines().nth(1).unwrap();
    assert!(row.ends_with(",0000000000005000"));
}

#[test]
fn kind_totals_in_declaration_order() {
    let heap = sample_heap();
    let (router, capture) = capture_router();

    let outcome = GcHandleReportEngine::new(&heap)
        .with_report(HandleReport::KindTotals)
        .with_format(OutputFormat::CommaDelimited)
        .run(&router, &CancellationToken::new())
        .unwrap();

    assert_eq!(outcome, ScanOutcome::Completed { rows_written: 2 });
    let contents = capture.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "Kind,Count");
    // Strong is declared before Pinned; unobserved kinds are absent
    assert_eq!(lines[1], "Strong,2");
    assert_eq!(lines[2], "Pinned,1");
}

#[test]
fn target_type_statistics_bucket_targets() {
    let heap = sample_heap();
    let (router, capture) = capture_router();

    GcHandleReportEngine::new(&heap)
        .with_report(HandleReport::TargetTypeStatistics)
        .with_format(OutputFormat::CommaDelimited)
        .run(&router, &CancellationToken::new())
        .unwrap();

    let contents = capture.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "TypeHandle,Count,TotalSize,TypeName");
    // two strings (24 + 32 = 56) sort before one 4 KiB array
    assert_eq!(lines[1], "0000000000000010,2,56,System.String");
    assert_eq!(lines[2], "0000000000000020,1,4096,System.Byte[]");
}

#[test]
fn structured_listing_round_trips() {
    let heap = SyntheticHeap::new()
        .with_named_type(0x10, "System.String")
        .with_handle(handle(
            0x7000,
            HandleKind::WeakShort,
            ObjectDescriptor::new(0x1000, Some(0x10), 24),
        ));

    let (router, capture) = capture_router();
    GcHandleReportEngine::new(&heap)
        .with_format(OutputFormat::Structured)
        .run(&router, &CancellationToken::new())
        .unwrap();

    assert_eq!(
        capture.contents(),
        "[{\"Handle\":\"0000000000007000\",\"Kind\":\"WeakShort\",\
         \"Target\":\"0000000000001000\",\"TargetType\":\"System.String\",\
         \"Dependent\":\"\"}]"
    );
}
