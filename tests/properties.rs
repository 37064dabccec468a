//! Model-based checks: drive a `RingBuffer` and a `VecDeque<u8>` with the same
//! random operation sequence and compare contents and accounting after every
//! step.

use std::collections::VecDeque;

use proptest::prelude::*;
use zcrb::{RingBuffer, RingError};

#[derive(Clone, Debug)]
enum Op {
    Write(Vec<u8>),
    LockedWrite(Vec<u8>),
    Read(usize),
    LockedRead(usize),
    Window(usize, usize),
    Copy(usize),
    Eat(usize),
    EatAll,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..24).prop_map(Op::Write),
        prop::collection::vec(any::<u8>(), 0..24).prop_map(Op::LockedWrite),
        (0usize..24).prop_map(Op::Read),
        (0usize..24).prop_map(Op::LockedRead),
        (0usize..24, 0usize..24).prop_map(|(max, take)| Op::Window(max, take)),
        (0usize..24).prop_map(Op::Copy),
        (0usize..24).prop_map(Op::Eat),
        Just(Op::EatAll),
    ]
}

fn apply(rb: &mut RingBuffer, model: &mut VecDeque<u8>, op: &Op) {
    match op {
        Op::Write(data) => {
            let result = rb.write(data);
            if data.len() <= rb.capacity() - model.len() {
                assert_eq!(result, Ok(()));
                model.extend(data.iter().copied());
            } else {
                assert!(matches!(result, Err(RingError::CapacityExceeded { .. })));
            }
        }
        Op::LockedWrite(data) => {
            let span = rb.write_lock_ptr().unwrap();
            let n = data.len().min(span.len());
            span[..n].copy_from_slice(&data[..n]);
            rb.write_commit(n).unwrap();
            model.extend(data[..n].iter().copied());
        }
        Op::Read(size) => {
            let mut buf = vec![0u8; *size];
            let n = rb.read(&mut buf).unwrap();
            assert_eq!(n, (*size).min(model.len()));
            let expected: Vec<u8> = model.drain(..n).collect();
            assert_eq!(&buf[..n], &expected[..]);
        }
        Op::LockedRead(size) => {
            let span = rb.read_lock_ptr().unwrap();
            let n = (*size).min(span.len());
            let got = span[..n].to_vec();
            rb.read_commit(n).unwrap();
            let expected: Vec<u8> = model.drain(..n).collect();
            assert_eq!(got, expected);
        }
        Op::Window(max, take) => {
            let span = rb.window_read_lock_ptr(*max).unwrap();
            assert!(span.len() <= *max);
            let n = (*take).min(span.len());
            let got = span[..n].to_vec();
            rb.window_read_commit(n).unwrap();
            let expected: Vec<u8> = model.drain(..n).collect();
            assert_eq!(got, expected);
        }
        Op::Copy(size) => {
            let mut buf = vec![0u8; *size];
            let n = rb.copy(&mut buf);
            assert_eq!(n, (*size).min(model.len()));
            assert!(buf[..n].iter().eq(model.iter().take(n)));
        }
        Op::Eat(size) => {
            let n = rb.eat(*size).unwrap();
            assert_eq!(n, (*size).min(model.len()));
            model.drain(..n);
        }
        Op::EatAll => {
            let n = rb.eat_all().unwrap();
            assert_eq!(n, model.len());
            model.clear();
        }
    }
}

proptest! {
    #[test]
    fn prop_matches_model(capacity in 1usize..32, ops in prop::collection::vec(op(), 0..64)) {
        let mut rb = RingBuffer::new(capacity).unwrap();
        let mut model = VecDeque::new();

        for op in &ops {
            apply(&mut rb, &mut model, op);

            prop_assert_eq!(rb.used(), model.len());
            prop_assert_eq!(rb.available() + rb.used(), rb.capacity());
            prop_assert_eq!(rb.empty(), model.is_empty());
            prop_assert_eq!(rb.full(), model.len() == capacity);
            prop_assert!(rb.read_lock_size() <= rb.used());
            prop_assert!(rb.write_lock_size() <= rb.available());

            let (head, tail) = rb.as_slices();
            prop_assert!(head.iter().chain(tail).eq(model.iter()));
        }
    }

    #[test]
    fn prop_write_then_read_roundtrips(
        offset in 0usize..16,
        data in prop::collection::vec(any::<u8>(), 0..=16),
    ) {
        let mut rb = RingBuffer::new(16).unwrap();
        rb.write(&vec![0u8; offset]).unwrap();
        rb.eat_all().unwrap();

        rb.write(&data).unwrap();
        let mut out = vec![0u8; data.len()];
        rb.read_exact(&mut out).unwrap();
        prop_assert_eq!(out, data);
        prop_assert!(rb.empty());
    }
}
