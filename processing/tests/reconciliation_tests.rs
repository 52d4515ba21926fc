mod common;

use common::TestGraph;
use kgi_core::log::Level;
use kgi_processing::{
    errors::ProcessingError,
    events::GraphEvent,
    model::BlockColor,
    test_helpers::{accepted, chain_changes, classification, hash, known},
};

/// G <- A, G <- B, {A, B} <- C
fn diamond() -> TestGraph {
    let graph = TestGraph::new();
    for block in [known(1, &[0]), known(2, &[0]), known(3, &[1, 2])] {
        graph.processor.on_block_known(&block).unwrap();
    }
    graph
}

#[test]
fn test_reconcile_with_chain_changes() {
    let graph = diamond();
    let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[1], &[3])));
    graph.processor.on_block_accepted(&block).unwrap();

    assert_eq!(graph.state(1), (BlockColor::Blue, false));
    assert_eq!(graph.state(2), (BlockColor::Red, false));
    assert!(graph.state(3).1);
    assert_eq!(graph.block(3).selected_parent_id, Some(graph.id(1)));
}

#[test]
fn test_reconcile_without_chain_changes() {
    let graph = diamond();
    let before = [0, 1, 2, 3].map(|n| graph.state(n));
    graph.processor.on_block_accepted(&accepted(3, classification(1, &[1], &[2]), None)).unwrap();

    let c = graph.block(3);
    assert_eq!(c.selected_parent_id, Some(graph.id(1)));
    assert_eq!(c.merge_set_blue_ids, vec![graph.id(1)]);
    assert_eq!(c.merge_set_red_ids, vec![graph.id(2)]);
    assert_eq!([0, 1, 2, 3].map(|n| graph.state(n)), before);
}

#[test]
fn test_membership_changes_only_for_listed_blocks() {
    let graph = diamond();
    graph.processor.on_block_accepted(&accepted(1, classification(0, &[0], &[]), Some(chain_changes(&[], &[1])))).unwrap();
    assert_eq!(graph.state(1), (BlockColor::Gray, true));
    assert_eq!(graph.state(0), (BlockColor::Blue, true));

    // B is colored by C's merge set but never joins the chain
    graph.processor.on_block_accepted(&accepted(2, classification(0, &[0], &[]), None)).unwrap();
    graph.processor.on_block_accepted(&accepted(3, classification(1, &[1, 2], &[]), Some(chain_changes(&[], &[3])))).unwrap();
    assert_eq!(graph.state(2), (BlockColor::Blue, false));
    assert_eq!(graph.state(1), (BlockColor::Blue, true));
    assert_eq!(graph.state(3), (BlockColor::Gray, true));
}

#[test]
fn test_reorg_flips_membership_and_colors() {
    let graph = diamond();
    graph.processor.on_block_known(&known(4, &[2])).unwrap();

    // Chain G -> A -> C
    graph.processor.on_block_accepted(&accepted(1, classification(0, &[0], &[]), Some(chain_changes(&[], &[1])))).unwrap();
    graph.processor.on_block_accepted(&accepted(2, classification(0, &[0], &[]), None)).unwrap();
    graph.processor.on_block_accepted(&accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[], &[3])))).unwrap();
    assert_eq!(graph.state(2), (BlockColor::Red, false));

    // Reorg to G -> B -> D
    let block = accepted(4, classification(2, &[2, 0], &[]), Some(chain_changes(&[3, 1], &[2, 4])));
    graph.processor.on_block_accepted(&block).unwrap();
    assert_eq!(graph.state(3), (BlockColor::Gray, false));
    assert_eq!(graph.state(1), (BlockColor::Gray, false));
    assert_eq!(graph.state(2), (BlockColor::Blue, true));
    assert_eq!(graph.state(4), (BlockColor::Gray, true));

    // And back again
    let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[4, 2], &[1, 3])));
    graph.processor.on_block_accepted(&block).unwrap();
    assert_eq!(graph.state(1), (BlockColor::Blue, true));
    assert_eq!(graph.state(2), (BlockColor::Red, false));
    assert_eq!(graph.state(3), (BlockColor::Gray, true));
    assert_eq!(graph.state(4), (BlockColor::Gray, false));
}

#[test]
fn test_added_blocks_classified_by_consensus_data() {
    let graph = diamond();
    graph.consensus.insert(hash(1), classification(0, &[0], &[]));
    let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[], &[1, 3])));
    graph.processor.on_block_accepted(&block).unwrap();
    assert_eq!(graph.state(0), (BlockColor::Blue, true));
    assert_eq!(graph.state(1), (BlockColor::Blue, true));
    assert_eq!(graph.state(2), (BlockColor::Red, false));
}

#[test]
fn test_rejected_reconciliation_commits_nothing() {
    let graph = diamond();

    let err = graph.processor.on_block_accepted(&accepted(9, classification(1, &[], &[]), None)).unwrap_err();
    assert!(matches!(err, ProcessingError::NotFound(missing) if missing == hash(9)));

    let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[1], &[3, 8])));
    let err = graph.processor.on_block_accepted(&block).unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidDiff(missing) if missing == hash(8)));

    // B has no classification anywhere
    let block = accepted(3, classification(1, &[1], &[]), Some(chain_changes(&[], &[2, 3])));
    let err = graph.processor.on_block_accepted(&block).unwrap_err();
    assert!(matches!(err, ProcessingError::ConsensusData(missing) if missing == hash(2)));

    let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[3], &[3])));
    let err = graph.processor.on_block_accepted(&block).unwrap_err();
    assert!(matches!(err, ProcessingError::BlockInBothRemovedAndAdded(both) if both == hash(3)));

    let c = graph.block(3);
    assert_eq!(c.selected_parent_id, None);
    assert!(c.merge_set_blue_ids.is_empty());
    for n in 1..=3 {
        assert_eq!(graph.state(n), (BlockColor::Gray, false));
    }
    assert!(graph.log.contains(Level::Warn, &format!("Rejected accepted block {}", hash(3))));
}

#[test]
fn test_events_in_arrival_order() {
    let graph = TestGraph::new();
    let events: Vec<GraphEvent> = vec![
        known(1, &[0]).into(),
        accepted(1, classification(0, &[0], &[]), Some(chain_changes(&[], &[1]))).into(),
        known(2, &[1]).into(),
        known(3, &[1]).into(),
        accepted(2, classification(1, &[1], &[]), Some(chain_changes(&[], &[2]))).into(),
        known(4, &[2, 3]).into(),
        accepted(3, classification(1, &[1], &[]), None).into(),
        accepted(4, classification(2, &[2], &[3]), Some(chain_changes(&[], &[4]))).into(),
    ];
    for event in events.iter() {
        graph.processor.handle(event).unwrap();
    }

    assert_eq!(graph.state(0), (BlockColor::Blue, true));
    assert_eq!(graph.state(1), (BlockColor::Blue, true));
    assert_eq!(graph.state(2), (BlockColor::Blue, true));
    assert_eq!(graph.state(3), (BlockColor::Red, false));
    assert_eq!(graph.state(4), (BlockColor::Gray, true));
    assert_eq!(graph.block(4).height, 3);
}
