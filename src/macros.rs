/// Runs `$x` once per bit of `$byte`, MSB first, with the bit bound to `$b`
#[macro_export]
macro_rules! unroll_for {
    ($b:ident in $byte: expr, $x: block) => {
        let mut $b = $byte >> 7;
        $x;
        $b = ($byte >> 6) & 1;
        $x;
        $b = ($byte >> 5) & 1;
        $x;
        $b = ($byte >> 4) & 1;
        $x;
        $b = ($byte >> 3) & 1;
        $x;
        $b = ($byte >> 2) & 1;
        $x;
        $b = ($byte >> 1) & 1;
        $x;
        $b = $byte & 1;
        $x;
    };
}

/// Runs `$x` 8 times, `$x` assigns `$bit` and the bits are packed MSB first
#[macro_export]
macro_rules! unroll_collect {
    ($bit:ident into $byte:ident, $x: block) => {
        let mut $byte: u8 = 0;
        let mut $bit: u8;
        $x;
        $byte = ($byte << 1) | $bit;
        $x;
        $byte = ($byte << 1) | $bit;
        $x;
        $byte = ($byte << 1) | $bit;
        $x;
        $byte = ($byte << 1) | $bit;
        $x;
        $byte = ($byte << 1) | $bit;
        $x;
        $byte = ($byte << 1) | $bit;
        $x;
        $byte = ($byte << 1) | $bit;
        $x;
        $byte = ($byte << 1) | $bit;
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn unroll_for_is_msb_first() {
        let mut bits = Vec::new();
        unroll_for!(bit in 0b1011_0010u8, {
            bits.push(bit);
        });
        assert_eq!(bits, [1, 0, 1, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn collect_inverts_for() {
        let mut bits = [0, 1, 1, 0, 1, 0, 0, 1].into_iter();
        unroll_collect!(bit into byte, {
            bit = bits.next().unwrap();
        });
        assert_eq!(byte, 0b0110_1001);
    }
}
