// src/encode/rle.rs

//! Run-length coding of byte streams.

/// `count` repetitions of `value`. Counts are never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub count: u32,
    pub value: u8,
}

/// Collapses maximal runs. Runs longer than `u32::MAX` are split.
pub fn encode(data: &[u8]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for &value in data {
        match runs.last_mut() {
            Some(run) if run.value == value && run.count < u32::MAX => run.count += 1,
            _ => runs.push(Run { count: 1, value }),
        }
    }
    runs
}

pub fn decode(runs: &[Run]) -> Vec<u8> {
    let total: usize = runs.iter().map(|r| r.count as usize).sum();
    let mut out = Vec::with_capacity(total);
    for run in runs {
        out.extend(std::iter::repeat(run.value).take(run.count as usize));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs() {
        let runs = encode(b"aaabccdddd");
        assert_eq!(
            runs,
            vec![
                Run { count: 3, value: b'a' },
                Run { count: 1, value: b'b' },
                Run { count: 2, value: b'c' },
                Run { count: 4, value: b'd' },
            ]
        );
        assert_eq!(decode(&runs), b"aaabccdddd".to_vec());
    }

    #[test]
    fn test_empty() {
        assert!(encode(&[]).is_empty());
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn test_mtf_output_collapses() {
        let ranks = crate::encode::mtf::encode(&[4, 4, 4, 4, 4, 9, 9, 9]);
        let runs = encode(&ranks);
        assert_eq!(runs.len(), 4);
        assert_eq!(decode(&runs), ranks);
    }
}
