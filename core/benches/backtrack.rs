//! Backtracking cost on hostile inputs.
//!
//! Captures grow one character at a time and retry every continuation, so
//! a pattern with several captures separated by a repeated literal is the
//! worst case. Ordinary captures stop at `/`, which bounds the search to one
//! path segment; `_` does not, which is why it is reserved for remainders.
//!
//! Inputs keep the literal tail intact so the suffix check passes, then hide
//! a failure earlier in the string, forcing the search to try every split.

use waypath::Eval;

fn main() {
    divan::main();
}

fn hostile_input(n: usize) -> String {
    "-".repeat(n) + "/-x"
}

#[divan::bench(args = [8, 16, 32, 64])]
fn three_captures_one_segment(bencher: divan::Bencher, n: usize) {
    let eval = Eval::single(":a-:b-:c-x").unwrap();
    let input = hostile_input(n);
    bencher.bench_local(|| eval.match_path(divan::black_box(&input)));
}

#[divan::bench(args = [8, 16, 32, 64])]
fn segments_bound_the_search(bencher: divan::Bencher, n: usize) {
    let eval = Eval::single("/:a/:b/:c/x").unwrap();
    let input = "/-".repeat(n) + "/z/x";
    bencher.bench_local(|| eval.match_path(divan::black_box(&input)));
}

/// `_` grows across every segment before the tail can match.
#[divan::bench(args = [8, 16, 32, 64])]
fn underscore_remainder(bencher: divan::Bencher, n: usize) {
    let eval = Eval::single("/:_/x").unwrap();
    let input = "/a".repeat(n) + "/x";
    bencher.bench_local(|| eval.match_path(divan::black_box(&input)));
}

#[divan::bench(args = [8, 16, 32])]
fn regex_baseline(bencher: divan::Bencher, n: usize) {
    let re = regex::Regex::new(r"^([^/]+)-([^/]+)-([^/]+)-x$").unwrap();
    let input = hostile_input(n);
    bencher.bench_local(|| re.is_match(divan::black_box(&input)));
}
