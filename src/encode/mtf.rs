// src/encode/mtf.rs

//! Move-to-front transform over the byte alphabet.
//!
//! The alphabet state lives in an [`MtfAlphabet`] owned by the caller, so two
//! channels never share ranking state and each call starts from the identity
//! permutation unless the caller deliberately threads a state through.

/// Ranked byte alphabet. `mtf[rank]` is the symbol, `rmtf[symbol]` its rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtfAlphabet {
    mtf: [u8; 256],
    rmtf: [u8; 256],
}

impl Default for MtfAlphabet {
    fn default() -> Self {
        Self::new()
    }
}

impl MtfAlphabet {
    /// Identity ranking `[0, 1, ..., 255]`.
    pub fn new() -> Self {
        let mut mtf = [0u8; 256];
        for (rank, slot) in mtf.iter_mut().enumerate() {
            *slot = rank as u8;
        }
        Self { mtf, rmtf: mtf }
    }

    #[inline]
    pub fn rank_of(&self, symbol: u8) -> u8 {
        self.rmtf[symbol as usize]
    }

    #[inline]
    pub fn symbol_at(&self, rank: u8) -> u8 {
        self.mtf[rank as usize]
    }

    /// Moves the symbol currently at `rank` to the front.
    #[inline]
    pub fn promote(&mut self, rank: u8) {
        let rank = rank as usize;
        self.mtf[..=rank].rotate_right(1);
        for (k, &symbol) in self.mtf[..=rank].iter().enumerate() {
            self.rmtf[symbol as usize] = k as u8;
        }
    }

    /// Current ranking, front first.
    pub fn as_slice(&self) -> &[u8; 256] {
        &self.mtf
    }
}

/// Encodes with a caller-supplied alphabet, leaving it in its final state.
pub fn encode_with(alphabet: &mut MtfAlphabet, data: &[u8]) -> Vec<u8> {
    data.iter()
        .map(|&symbol| {
            let rank = alphabet.rank_of(symbol);
            alphabet.promote(rank);
            rank
        })
        .collect()
}

/// Decodes with a caller-supplied alphabet, mirroring [`encode_with`].
pub fn decode_with(alphabet: &mut MtfAlphabet, ranks: &[u8]) -> Vec<u8> {
    ranks
        .iter()
        .map(|&rank| {
            let symbol = alphabet.symbol_at(rank);
            alphabet.promote(rank);
            symbol
        })
        .collect()
}

/// Encodes `data` starting from the identity alphabet.
pub fn encode(data: &[u8]) -> Vec<u8> {
    encode_with(&mut MtfAlphabet::new(), data)
}

/// Inverse of [`encode`].
pub fn decode(ranks: &[u8]) -> Vec<u8> {
    decode_with(&mut MtfAlphabet::new(), ranks)
}
