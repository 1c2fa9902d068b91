use honggfuzz::fuzz;

use fountain_ur::Part;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if let Ok(part) = Part::from_cbor(data) {
                let cbor = part.to_cbor().unwrap();
                assert_eq!(Part::from_cbor(&cbor).unwrap(), part);
            }
        });
    }
}
