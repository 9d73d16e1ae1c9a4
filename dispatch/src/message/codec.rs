//! One-shot wire encoding for each message kind. No decode path: this
//! exists only so `BtMessage::send` has real bytes to write, which is
//! what makes the partial-write / sending-in-progress invariants
//! honestly testable.

use bytes::{BufMut, BytesMut};

pub fn encode_keep_alive() -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32(0);
    buf
}

pub fn encode_choke() -> BytesMut {
    encode_fixed(0)
}

pub fn encode_unchoke() -> BytesMut {
    encode_fixed(1)
}

pub fn encode_interested() -> BytesMut {
    encode_fixed(2)
}

pub fn encode_not_interested() -> BytesMut {
    encode_fixed(3)
}

fn encode_fixed(id: u8) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32(1);
    buf.put_u8(id);
    buf
}

// have: <len=0005><id=4><piece index>
pub fn encode_have(idx: u32) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32(5);
    buf.put_u8(4);
    buf.put_u32(idx);
    buf
}

// bitfield: <len=0001+X><id=5><bitfield>
pub fn encode_bitfield(bits: &[u8]) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32(1 + bits.len() as u32);
    buf.put_u8(5);
    buf.extend_from_slice(bits);
    buf
}

// request: <len=0013><id=6><index><begin><length>
pub fn encode_request(index: u32, begin: u32, length: u32) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32(13);
    buf.put_u8(6);
    buf.put_u32(index);
    buf.put_u32(begin);
    buf.put_u32(length);
    buf
}

// piece: <len=0009+X><id=7><index><begin><block>
pub fn encode_piece(index: u32, begin: u32, data: &[u8]) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32(9 + data.len() as u32);
    buf.put_u8(7);
    buf.put_u32(index);
    buf.put_u32(begin);
    buf.extend_from_slice(data);
    buf
}

// cancel: <len=0013><id=8><index><begin><length>
pub fn encode_cancel(index: u32, begin: u32, length: u32) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32(13);
    buf.put_u8(8);
    buf.put_u32(index);
    buf.put_u32(begin);
    buf.put_u32(length);
    buf
}

// port: <len=0003><id=9><listen-port>
pub fn encode_port(port: u32) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u32(3);
    buf.put_u8(9);
    buf.put_u16(port as u16);
    buf
}
