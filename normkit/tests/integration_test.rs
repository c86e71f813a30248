use approx::assert_abs_diff_eq;
use image::{Rgb, RgbImage};
use normkit::core::ops::normalization::op::{
    BIAS, BIAS_GRAD, SAVED_MEAN, SAVED_VARIANCE, SCALE, SCALE_GRAD, X, X_GRAD, Y, Y_GRAD,
};
use normkit::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn random_tensor(seed: u64, shape: &[usize]) -> Tensor<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n: usize = shape.iter().product();
    let data = (0..n).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    Tensor::from_vec(data, shape).unwrap()
}

#[test]
fn test_layer_matches_registered_operator() {
    let x = random_tensor(1, &[2, 3, 5, 5]);
    let layer = InstanceNorm::<f32>::new(3);
    let layer_out = layer.forward_with_stats(&x).unwrap();

    let registry = OpRegistry::with_builtin_ops();
    let inputs = NamedTensors::new()
        .with(X, x.clone())
        .with(SCALE, layer.scale().clone())
        .with(BIAS, layer.bias().clone());
    let attrs = OpAttrs::new().with("epsilon", AttrValue::Float(1e-5));
    let outputs = registry.run("instance_norm", &inputs, &attrs).unwrap();

    assert_eq!(outputs.get(Y).unwrap().as_f32("test").unwrap(), &layer_out.y);
    assert_eq!(
        outputs.get(SAVED_MEAN).unwrap().as_f32("test").unwrap(),
        &layer_out.saved_mean
    );

    let dy = random_tensor(2, &[2, 3, 5, 5]);
    let grad_inputs = NamedTensors::new()
        .with(X, x.clone())
        .with(SCALE, layer.scale().clone())
        .with(Y_GRAD, dy.clone())
        .with(SAVED_MEAN, outputs.get(SAVED_MEAN).unwrap().clone())
        .with(SAVED_VARIANCE, outputs.get(SAVED_VARIANCE).unwrap().clone());
    let grads = registry
        .run("instance_norm_grad", &grad_inputs, &attrs)
        .unwrap();

    let layer_grads = layer.backward(&x, &dy).unwrap();
    assert_eq!(
        grads.get(X_GRAD).unwrap().as_f32("test").unwrap(),
        &layer_grads.x_grad
    );
    assert_eq!(
        grads.get(SCALE_GRAD).unwrap().as_f32("test").unwrap(),
        &layer_grads.scale_grad
    );
    assert_eq!(
        grads.get(BIAS_GRAD).unwrap().as_f32("test").unwrap(),
        &layer_grads.bias_grad
    );
}

#[test]
fn test_operator_rejects_integer_input() {
    let registry = OpRegistry::with_builtin_ops();
    let inputs = NamedTensors::new()
        .with(X, Tensor::<u8>::zeros(&[1, 3, 2, 2]))
        .with(SCALE, Tensor::<f32>::ones(&[3]))
        .with(BIAS, Tensor::<f32>::zeros(&[3]));
    let err = registry
        .run("instance_norm", &inputs, &OpAttrs::new())
        .unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_image_to_instance_norm_pipeline() {
    let dir = TempDir::new().unwrap();
    let image_path = dir.path().join("gradient.png");
    RgbImage::from_fn(8, 4, |x, y| Rgb([(x * 30) as u8, (y * 60) as u8, 128]))
        .save(&image_path)
        .unwrap();

    let mut config_file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(config_file, "image_backend = \"cv2\"\nnormalize = true").unwrap();
    let config = normkit::vision::ConfigLoader::new()
        .load_from_file(config_file.path())
        .unwrap();
    assert_eq!(config.image_backend, ImageBackend::Cv2);

    let decoded = image_load(&image_path, &config).unwrap();
    assert!(matches!(decoded, DecodedImage::Array(_)));

    let chw = image_load_chw(&image_path, &config).unwrap();
    assert_eq!(chw.shape().dims(), &[3, 4, 8]);
    // Red channel comes first after the BGR -> RGB conversion
    assert_abs_diff_eq!(chw[&[0, 0, 7][..]], 210.0 / 255.0, epsilon = 1e-6);

    let batch = chw.reshape(&[1, 3, 4, 8]).unwrap();
    let out = InstanceNorm::<f32>::new(3).forward_with_stats(&batch).unwrap();

    for (c, slice) in out.y.to_vec().chunks(32).enumerate() {
        let mean = slice.iter().sum::<f32>() / 32.0;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-5);
        if c == 2 {
            // Constant blue channel normalizes to (nearly) zero
            assert!(slice.iter().all(|v| v.abs() < 1e-3));
        }
    }
}

#[test]
fn test_backends_produce_identical_kernel_input() {
    let dir = TempDir::new().unwrap();
    let image_path = dir.path().join("noise.png");
    let mut rng = StdRng::seed_from_u64(9);
    RgbImage::from_fn(5, 3, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
        .save(&image_path)
        .unwrap();

    let tensors: Vec<Tensor<f32>> = ImageBackend::ALL
        .into_iter()
        .map(|backend| {
            let config = VisionConfig::new().with_backend(backend);
            image_load_chw(&image_path, &config).unwrap()
        })
        .collect();
    assert_eq!(tensors[0], tensors[1]);
    assert_eq!(tensors[1], tensors[2]);
}

#[test]
fn test_invalid_backend_name() {
    let err = "foo".parse::<ImageBackend>().unwrap_err();
    assert!(matches!(err, TensorError::InvalidArgument { .. }));
    assert!(err.to_string().contains("['pil', 'cv2', 'tensor']"));
}
