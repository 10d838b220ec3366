/// Prefix edit distance: the smallest edit distance between `x` and any
/// prefix of `y`.
///
/// Returns `delta + 1` as soon as the distance is known to exceed `delta`.
/// Prefixes of `y` longer than `|x| + delta` can never be within `delta`,
/// so only that many columns of the table are filled.
pub fn ped(x: &str, y: &str, delta: usize) -> usize {
    let x: Vec<char> = x.chars().collect();
    let y: Vec<char> = y.chars().collect();
    let n = x.len() + 1;
    let m = (x.len() + delta + 1).min(y.len() + 1);

    let mut prev: Vec<usize> = (0..m).collect();
    let mut curr = vec![0usize; m];

    for i in 1..n {
        curr[0] = i;
        let mut row_min = curr[0];
        for j in 1..m {
            let substitution = prev[j - 1] + usize::from(x[i - 1] != y[j - 1]);
            curr[j] = substitution.min(prev[j] + 1).min(curr[j - 1] + 1);
            row_min = row_min.min(curr[j]);
        }
        if row_min > delta {
            return delta + 1;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let best = prev.iter().copied().min().unwrap_or(0);
    if best > delta { delta + 1 } else { best }
}

#[test]
fn test_ped() {
    assert_eq!(ped("frei", "frei", 0), 0);
    assert_eq!(ped("frei", "freiburg", 0), 0);
    assert_eq!(ped("frei", "brei", 2), 1);
    assert_eq!(ped("freibu", "frei", 2), 2);
    assert_eq!(ped("freibu", "brei", 2), 3);
    assert_eq!(ped("", "anything", 0), 0);
    assert_eq!(ped("abc", "", 5), 3);
    assert_eq!(ped("abc", "", 1), 2);
    assert_eq!(ped("eyjaffjala", "eyjafjallajokull", 2), 2);
}

#[test]
fn test_ped_unicode() {
    assert_eq!(ped("jökull", "jökull", 0), 0);
    assert_eq!(ped("jokull", "jökull", 1), 1);
}
