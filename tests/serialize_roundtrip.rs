use rand::rngs::StdRng;
use rand::SeedableRng;

use siliconnn::{DatasetStorage, Error, Network, NetworkSpec};

fn trained(seed: u64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut net = Network::new(&NetworkSpec::new(3, 5, 0.03), &mut rng).unwrap();
    let storage = DatasetStorage::from_records(
        3,
        [(0, [0.1, 0.2, 0.3]), (1, [0.9, -0.4, 0.0]), (2, [1.5, 1.0, -2.0])],
    )
    .unwrap();
    let mut view = storage.view();
    siliconnn::train(&mut net, &mut view, &storage, 3, &mut rng).unwrap();
    net
}

#[test]
fn save_then_load_is_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.nn");
    let net = trained(21);
    net.save(&path).unwrap();

    let loaded = Network::load(&path).unwrap();
    assert_eq!(loaded.input_size(), 3);
    assert_eq!(loaded.hidden_size(), 5);
    assert_eq!(loaded.learning_rate().to_bits(), net.learning_rate().to_bits());
    assert_eq!(loaded.output_bias().to_bits(), net.output_bias().to_bits());
    for (region, (a, b)) in [
        ("w_in", (loaded.params().w_in(), net.params().w_in())),
        ("b_hidden", (loaded.params().b_hidden(), net.params().b_hidden())),
        ("w_out", (loaded.params().w_out(), net.params().w_out())),
    ] {
        let a: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
        let b: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a, b, "{region} differs");
    }
}

#[test]
fn loaded_network_predicts_like_the_original() {
    let mut net = trained(4);
    let mut loaded = Network::from_bytes(&net.to_bytes().unwrap()).unwrap();
    let x = [0.25, -0.75, 1.0];
    assert_eq!(
        net.forward(&x).unwrap().to_bits(),
        loaded.forward(&x).unwrap().to_bits()
    );
}

#[test]
fn file_size_matches_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.nn");
    trained(1).save(&path).unwrap();
    let len = std::fs::metadata(&path).unwrap().len();
    assert_eq!(len, 24 + 8 * 5 * (3 + 3));
}

#[test]
fn save_truncates_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.nn");
    std::fs::write(&path, vec![0xAB; 4096]).unwrap();
    trained(2).save(&path).unwrap();
    assert!(Network::load(&path).is_ok());
}

#[test]
fn truncated_and_padded_files_are_rejected() {
    let bytes = trained(5).to_bytes().unwrap();

    for cut in [0, 10, 24, 25, bytes.len() - 1] {
        let err = Network::from_bytes(&bytes[..cut]).unwrap_err();
        assert!(matches!(err, Error::ModelFormat(_)), "cut at {cut}: {err}");
    }

    let mut padded = bytes;
    padded.push(0);
    assert!(matches!(
        Network::from_bytes(&padded),
        Err(Error::ModelFormat(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Network::load(dir.path().join("absent.nn")),
        Err(Error::Io(_))
    ));
}
