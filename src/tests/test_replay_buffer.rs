use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use crate::replay_buffer::{ReplayBuffer, Transition};

fn transition(i: usize) -> Transition {
    Transition {
        state: array![i as f64],
        action: i % 2,
        reward: i as f64,
        next_state: array![(i + 1) as f64],
        done: false,
    }
}

#[test]
fn test_replay_buffer_record_and_sample() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut buffer = ReplayBuffer::new(10);
    buffer.record(transition(0));
    assert_eq!(buffer.len(), 1);
    let sample = buffer.sample(1, &mut rng);
    assert_eq!(sample[0], &transition(0));
}

#[test]
fn test_replay_buffer_evicts_oldest() {
    let mut buffer = ReplayBuffer::new(5);
    for i in 1..=7 {
        buffer.record(transition(i));
    }

    assert_eq!(buffer.len(), 5);
    let rewards: Vec<f64> = buffer.iter().map(|t| t.reward).collect();
    assert_eq!(rewards, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn test_replay_buffer_is_empty() {
    let mut buffer = ReplayBuffer::new(10);
    assert!(buffer.is_empty());
    buffer.record(transition(0));
    assert!(!buffer.is_empty());
}

#[test]
fn test_replay_buffer_zero_capacity_stays_empty() {
    let mut buffer = ReplayBuffer::new(0);
    buffer.record(transition(0));
    assert!(buffer.is_empty());
}

#[test]
fn test_replay_buffer_sample_size() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut buffer = ReplayBuffer::new(10);
    for i in 0..5 {
        buffer.record(transition(i));
    }

    assert_eq!(buffer.sample(1, &mut rng).len(), 1);
    assert_eq!(buffer.sample(3, &mut rng).len(), 3);
    // Capped at the number of stored transitions
    assert_eq!(buffer.sample(32, &mut rng).len(), 5);
    assert!(ReplayBuffer::new(4).sample(2, &mut rng).is_empty());
}

#[test]
fn test_replay_buffer_sample_without_replacement() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut buffer = ReplayBuffer::new(100);
    for i in 0..100 {
        buffer.record(transition(i));
    }

    for _ in 0..20 {
        let sample = buffer.sample(32, &mut rng);
        let distinct: HashSet<u64> = sample.iter().map(|t| t.reward.to_bits()).collect();
        assert_eq!(distinct.len(), 32);
    }
}
