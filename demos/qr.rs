use qrcode::QrCode;

use std::io::Write;

fn main() {
    env_logger::init();

    let payload = std::env::args().next_back().unwrap();
    let ur = fountain_ur::Ur::bytes(payload.as_bytes()).unwrap();
    let options = fountain_ur::fountain::Options::default().with_max_fragment_length(20);
    let encoder = ur.encoder(&options).unwrap();
    let mut stdout = std::io::stdout();
    for part in encoder {
        let cbor = part.to_cbor().unwrap();
        let code = QrCode::new(&cbor).unwrap();
        let string = code
            .render::<char>()
            .quiet_zone(false)
            .module_dimensions(2, 1)
            .build();
        stdout.write_all(format!("{string}\n").as_bytes()).unwrap();
        stdout
            .write_all(format!("{}/{}\n\n\n\n", ur.ur_type(), part.sequence_id()).as_bytes())
            .unwrap();
        stdout.flush().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1000));
    }
}
