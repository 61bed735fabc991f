/// LSB-first bit packer, as used by GIF LZW streams and VP8L.
pub struct LsbWriter {
    out:   Vec<u8>,
    acc:   u64,
    nbits: u32,
}

impl LsbWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { out: Vec::with_capacity(capacity), acc: 0, nbits: 0 }
    }

    /// Append the low `n` bits of `value`, least significant first.
    pub fn bits(&mut self, value: u32, n: u32) {
        self.acc |= (value as u64 & ((1u64 << n) - 1)) << self.nbits;
        self.nbits += n;
        while self.nbits >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.nbits -= 8;
        }
    }

    /// Append a prefix code most significant bit first.
    pub fn code(&mut self, code: u32, len: u32) {
        for i in (0..len).rev() {
            self.bits((code >> i) & 1, 1);
        }
    }

    /// Flush, zero-filling the last partial byte.
    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.out.push(self.acc as u8);
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_low_bits_first() {
        let mut w = LsbWriter::with_capacity(2);
        w.bits(0b1, 1);
        w.bits(0b10, 2);
        w.bits(0x1FF, 9);
        assert_eq!(w.finish(), vec![0b1111_1101, 0b0000_1111]);
    }

    #[test]
    fn codes_are_msb_first() {
        let mut w = LsbWriter::with_capacity(1);
        w.code(0b110, 3);
        assert_eq!(w.finish(), vec![0b0000_0011]);
    }
}
