//! CRC-32 (IEEE 802.3, reflected, polynomial `0xEDB8_8320`).

pub const fn init() -> u32 {
    0xFFFF_FFFF
}

pub fn update(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

pub const fn finalize(crc: u32) -> u32 {
    !crc
}

pub fn checksum(data: &[u8]) -> u32 {
    finalize(update(init(), data))
}
