//! Single-threaded model checks: both rings behave like a bounded VecDeque.

use proptest::prelude::*;
use ringping_ring::{mpsc, spsc, PopError, PushError};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Push(u32),
    Pop,
    Burst(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u32>().prop_map(Op::Push),
        Just(Op::Pop),
        (0usize..6).prop_map(Op::Burst),
    ]
}

fn capacity() -> impl Strategy<Value = usize> {
    (1u32..5).prop_map(|shift| 1usize << shift)
}

proptest! {
    #[test]
    fn mpsc_matches_model(cap in capacity(), ops in prop::collection::vec(op(), 0..200)) {
        let (tx, mut rx) = mpsc::channel::<u32>(cap).unwrap();
        let mut model = VecDeque::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    let res = tx.try_push(v);
                    if model.len() == cap {
                        prop_assert_eq!(res, Err(PushError::Full(v)));
                    } else {
                        prop_assert_eq!(res, Ok(()));
                        model.push_back(v);
                    }
                }
                Op::Pop => {
                    let expected = model.pop_front().ok_or(PopError::Empty);
                    prop_assert_eq!(rx.try_pop(), expected);
                }
                Op::Burst(max) => {
                    let mut out = Vec::new();
                    let n = rx.pop_burst(&mut out, max);
                    let expected: Vec<u32> = (0..max.min(model.len()))
                        .filter_map(|_| model.pop_front())
                        .collect();
                    prop_assert_eq!(n, expected.len());
                    prop_assert_eq!(out, expected);
                }
            }
            prop_assert_eq!(rx.len(), model.len());
        }
    }

    #[test]
    fn spsc_matches_model(cap in capacity(), ops in prop::collection::vec(op(), 0..200)) {
        let (mut tx, mut rx) = spsc::channel::<u32>(cap).unwrap();
        let mut model = VecDeque::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    let res = tx.try_push(v);
                    if model.len() == cap {
                        prop_assert_eq!(res, Err(PushError::Full(v)));
                    } else {
                        prop_assert_eq!(res, Ok(()));
                        model.push_back(v);
                    }
                }
                Op::Pop | Op::Burst(_) => {
                    let expected = model.pop_front().ok_or(PopError::Empty);
                    prop_assert_eq!(rx.try_pop(), expected);
                }
            }
            prop_assert_eq!(tx.len(), model.len());
        }
    }
}
