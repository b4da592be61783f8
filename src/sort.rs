//! In-place quicksort with an explicit stack
//!
//! Partitions longer than [`QSORT_THRESHOLD`] are split around a median of three
//! pivot, shorter ones are finished with insertion sort. The larger partition is
//! pushed onto a fixed size stack and the smaller one is processed right away,
//! so the stack depth never exceeds `log2(len)`. Not stable, worst case is still
//! quadratic for adversarial input.

/// Partitions of this length or shorter are sorted with insertion sort
pub const QSORT_THRESHOLD: usize = 9;

/// Number of pending partitions the explicit stack can hold
pub const STACK_DEPTH: usize = 80;

/// Sort slice in ascending order of the key extracted by `key`
pub fn sort_by_key<T, K, F>(items: &mut [T], key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let less = |a: &T, b: &T| key(a) < key(b);

    let mut stack = [(0usize, 0usize); STACK_DEPTH];
    let mut top = 0;
    let mut base = 0;
    let mut limit = items.len();

    loop {
        let len = limit - base;
        if len > QSORT_THRESHOLD {
            // move pivot to the base
            items.swap(base, base + len / 2);

            // ensure items[i] <= items[base] <= items[j], which also
            // bounds both scans below
            let mut i = base + 1;
            let mut j = limit - 1;
            if less(&items[j], &items[i]) {
                items.swap(i, j);
            }
            if less(&items[base], &items[i]) {
                items.swap(base, i);
            }
            if less(&items[j], &items[base]) {
                items.swap(base, j);
            }

            loop {
                loop {
                    i += 1;
                    if !less(&items[i], &items[base]) {
                        break;
                    }
                }
                loop {
                    j -= 1;
                    if !less(&items[base], &items[j]) {
                        break;
                    }
                }
                if i > j {
                    break;
                }
                items.swap(i, j);
            }
            items.swap(base, j);

            // push the larger partition, continue with the smaller one
            if j - base > limit - i {
                stack[top] = (base, j);
                base = i;
            } else {
                stack[top] = (i, limit);
                limit = j;
            }
            top += 1;
        } else {
            for i in base + 1..limit {
                let mut j = i - 1;
                while less(&items[j + 1], &items[j]) {
                    items.swap(j + 1, j);
                    if j == base {
                        break;
                    }
                    j -= 1;
                }
            }

            if top == 0 {
                break;
            }
            top -= 1;
            (base, limit) = stack[top];
        }
    }
}
