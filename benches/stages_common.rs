#![allow(dead_code)]

use criterion::measurement::WallTime;
use criterion::BenchmarkGroup;
use std::time::Duration;

pub const SIZES_SMALL: &[usize] = &[8192, 65536];
pub const SIZES_ALL: &[usize] = &[8192, 65536, 1_048_576];

pub fn cap(group: &mut BenchmarkGroup<'_, WallTime>) {
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);
}

/// English-like text of exactly `size` bytes.
pub fn get_test_data(size: usize) -> String {
    let pattern = "The quick brown fox jumps over the lazy dog. \
                   Huffman coding assigns shorter codes to frequent symbols.\n";
    let full = pattern.repeat((size / pattern.len()) + 1);
    full[..size].to_string()
}
