use blobcorr::{
    aggregate, compute_similarity_map, BlobCorrError, Grid, Kernel, KernelParam, Pipeline,
    PipelineConfig, Reduction, Scoring,
};

/// Paints Gaussian bumps onto a black background, clamped to [0, 1].
fn blob_field(width: usize, height: usize, centers: &[(usize, usize)], sigma: f32) -> Grid {
    let mut data = vec![0.0f32; width * height];
    for &(cx, cy) in centers {
        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - cx as f32;
                let dy = y as f32 - cy as f32;
                data[y * width + x] += (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            }
        }
    }
    for v in &mut data {
        *v = v.min(1.0);
    }
    Grid::new(data, width, height).unwrap()
}

fn argmax(grid: &Grid) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_score = f32::NEG_INFINITY;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.at(x, y) > best_score {
                best_score = grid.at(x, y);
                best = (x, y);
            }
        }
    }
    best
}

#[test]
fn pipeline_locates_blobs_at_known_centers() {
    let centers = [(12usize, 14usize), (28usize, 25usize)];
    let image = blob_field(40, 40, &centers, 1.5);

    let config = PipelineConfig {
        filter_intensity: 0.2,
        kernel_params: vec![
            KernelParam::new(5, 1.0).unwrap(),
            KernelParam::new(7, 1.5).unwrap(),
        ],
        reduction: Reduction::Mean,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let aggregated = pipeline.run_image(&image).unwrap();

    assert_eq!(aggregated.map().width(), 40);
    assert_eq!(aggregated.map().height(), 40);
    assert_eq!(aggregated.base_maps().len(), 2);
    assert_eq!(
        aggregated.base_maps()[0].params(),
        KernelParam::new(5, 1.0).unwrap()
    );
    assert_eq!(
        aggregated.base_maps()[1].params(),
        KernelParam::new(7, 1.5).unwrap()
    );
    assert!(aggregated.map().as_slice().iter().all(|&v| v >= 0.0));

    let (bx, by) = argmax(aggregated.map());
    let near_a_center = centers.iter().any(|&(cx, cy)| {
        bx.abs_diff(cx) <= 2 && by.abs_diff(cy) <= 2
    });
    assert!(near_a_center, "peak ({bx}, {by}) not near any blob center");
}

#[test]
fn all_zero_image_flows_through_to_all_zero_aggregate() {
    let image = Grid::zeros(10, 10).unwrap();
    let config = PipelineConfig {
        filter_intensity: 0.5,
        kernel_params: vec![KernelParam::new(3, 1.0).unwrap()],
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let aggregated = pipeline.run_image(&image).unwrap();
    assert!(aggregated.map().as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn single_kernel_mean_aggregation_is_identity() {
    let image = blob_field(20, 20, &[(10, 10)], 1.2);
    let config = PipelineConfig {
        filter_intensity: 0.2,
        kernel_params: vec![KernelParam::new(5, 1.2).unwrap()],
        reduction: Reduction::Mean,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let aggregated = pipeline.run_image(&image).unwrap();

    let base = aggregated.base_maps()[0].map();
    for (&got, &want) in aggregated.map().as_slice().iter().zip(base.as_slice()) {
        assert!((got - want).abs() < 1e-6);
    }
}

#[test]
fn mean_of_two_identical_maps_equals_either() {
    let image = blob_field(16, 16, &[(8, 8)], 1.0);
    let kernel = Kernel::generate(KernelParam::new(5, 1.0).unwrap()).unwrap();
    let a = compute_similarity_map(&image, &kernel, Scoring::RawCorrelation).unwrap();
    let b = a.clone();

    let aggregated = aggregate(vec![a.clone(), b], Reduction::Mean).unwrap();
    for (&got, &want) in aggregated
        .map()
        .as_slice()
        .iter()
        .zip(a.map().as_slice())
    {
        assert!((got - want).abs() < 1e-6);
    }
}

#[test]
fn stage_errors_propagate_unchanged() {
    let image = Grid::zeros(4, 4).unwrap();
    let config = PipelineConfig {
        filter_intensity: 0.5,
        kernel_params: vec![KernelParam::new(5, 1.0).unwrap()],
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let err = pipeline.run_image(&image).err().unwrap();
    assert_eq!(
        err,
        BlobCorrError::KernelTooLarge {
            size: 5,
            img_width: 4,
            img_height: 4,
        }
    );
}

#[test]
fn cosine_pipeline_runs_end_to_end() {
    let image = blob_field(24, 24, &[(12, 12)], 1.5);
    let config = PipelineConfig {
        filter_intensity: 0.1,
        kernel_params: vec![
            KernelParam::new(5, 1.0).unwrap(),
            KernelParam::new(7, 1.5).unwrap(),
        ],
        scoring: Scoring::Cosine,
        reduction: Reduction::Max,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let aggregated = pipeline.run_image(&image).unwrap();

    assert!(aggregated.map().max_value() > 0.0);
    let (bx, by) = argmax(aggregated.map());
    assert!(bx.abs_diff(12) <= 2 && by.abs_diff(12) <= 2);
}
