//! Single-layer LSTM with a dense read-out, trained by back-propagation
//! through time and Adam.
//!
//! Gate blocks are stacked in the order input, forget, cell candidate,
//! output along the first axis of the kernels.

use super::{check_inputs, check_targets, SequenceModel};
use crate::config::ForecasterConfig;
use crate::error::{ForecastError, Result};
use ndarray::{s, Array, Array1, Array2, Array3, ArrayView3, Axis, Dimension, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use tracing::debug;

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-7;

/// Trainable tensors, also used to hold their gradients and Adam moments
#[derive(Debug, Clone)]
struct LstmParams {
    /// Input kernel `(4H, 1)`
    w: Array2<f64>,
    /// Recurrent kernel `(4H, H)`
    u: Array2<f64>,
    /// Gate bias `(4H)`
    b: Array1<f64>,
    /// Read-out weights `(O, H)`
    v: Array2<f64>,
    /// Read-out bias `(O)`
    c: Array1<f64>,
}

impl LstmParams {
    fn init(hidden: usize, outputs: usize, rng: &mut StdRng) -> Self {
        let glorot = |fan_in: usize, fan_out: usize| {
            let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
            Uniform::new(-limit, limit)
        };
        let kernel_dist = glorot(1, 4 * hidden);
        let recurrent_limit = (1.0 / hidden as f64).sqrt();
        let recurrent_dist = Uniform::new(-recurrent_limit, recurrent_limit);
        let dense_dist = glorot(hidden, outputs);

        let w = Array2::from_shape_fn((4 * hidden, 1), |_| kernel_dist.sample(&mut *rng));
        let u = Array2::from_shape_fn((4 * hidden, hidden), |_| recurrent_dist.sample(&mut *rng));
        let v = Array2::from_shape_fn((outputs, hidden), |_| dense_dist.sample(&mut *rng));

        // unit forget bias
        let mut b = Array1::zeros(4 * hidden);
        b.slice_mut(s![hidden..2 * hidden]).fill(1.0);

        Self {
            w,
            u,
            b,
            v,
            c: Array1::zeros(outputs),
        }
    }

    fn zeros_like(other: &Self) -> Self {
        Self {
            w: Array2::zeros(other.w.raw_dim()),
            u: Array2::zeros(other.u.raw_dim()),
            b: Array1::zeros(other.b.raw_dim()),
            v: Array2::zeros(other.v.raw_dim()),
            c: Array1::zeros(other.c.raw_dim()),
        }
    }

    fn norm(&self) -> f64 {
        let sq = |a: f64, x: &f64| a + x * x;
        (self.w.fold(0.0, sq)
            + self.u.fold(0.0, sq)
            + self.b.fold(0.0, sq)
            + self.v.fold(0.0, sq)
            + self.c.fold(0.0, sq))
        .sqrt()
    }

    fn scale(&mut self, factor: f64) {
        self.w *= factor;
        self.u *= factor;
        self.b *= factor;
        self.v *= factor;
        self.c *= factor;
    }
}

/// Adam optimizer state
#[derive(Debug, Clone)]
struct Adam {
    step: i32,
    m: LstmParams,
    v: LstmParams,
}

impl Adam {
    fn new(params: &LstmParams) -> Self {
        Self {
            step: 0,
            m: LstmParams::zeros_like(params),
            v: LstmParams::zeros_like(params),
        }
    }

    fn update(&mut self, params: &mut LstmParams, grads: &LstmParams, learning_rate: f64) {
        self.step += 1;
        let lr_t = learning_rate * (1.0 - ADAM_BETA2.powi(self.step)).sqrt()
            / (1.0 - ADAM_BETA1.powi(self.step));

        adam_step(&mut params.w, &grads.w, &mut self.m.w, &mut self.v.w, lr_t);
        adam_step(&mut params.u, &grads.u, &mut self.m.u, &mut self.v.u, lr_t);
        adam_step(&mut params.b, &grads.b, &mut self.m.b, &mut self.v.b, lr_t);
        adam_step(&mut params.v, &grads.v, &mut self.m.v, &mut self.v.v, lr_t);
        adam_step(&mut params.c, &grads.c, &mut self.m.c, &mut self.v.c, lr_t);
    }
}

fn adam_step<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    lr_t: f64,
) {
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g;
            *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g;
            *p -= lr_t * *m / (v.sqrt() + ADAM_EPSILON);
        });
}

/// Activations of one time step, kept for the backward pass
struct StepCache {
    x: Array2<f64>,
    h_prev: Array2<f64>,
    c_prev: Array2<f64>,
    i: Array2<f64>,
    f: Array2<f64>,
    g: Array2<f64>,
    o: Array2<f64>,
    tanh_c: Array2<f64>,
}

/// LSTM regressor mapping `lags` scaled prices to `horizon` scaled prices
#[derive(Debug, Clone)]
pub struct LstmRegressor {
    name: String,
    input_len: usize,
    output_len: usize,
    hidden_size: usize,
    learning_rate: f64,
    batch_size: usize,
    gradient_clip: Option<f64>,
    params: LstmParams,
    optimizer: Adam,
    rng: StdRng,
    loss_history: Vec<f64>,
}

impl LstmRegressor {
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Mean training loss of every epoch run so far
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    fn forward(&self, x: &ArrayView3<f64>, keep_cache: bool) -> (Array2<f64>, Vec<StepCache>) {
        let batch = x.shape()[0];
        let steps = x.shape()[1];
        let hd = self.hidden_size;
        let p = &self.params;

        let mut h = Array2::<f64>::zeros((batch, hd));
        let mut c = Array2::<f64>::zeros((batch, hd));
        let mut caches = Vec::with_capacity(if keep_cache { steps } else { 0 });

        for t in 0..steps {
            let x_t = x.slice(s![.., t, ..]).to_owned();
            let z = x_t.dot(&p.w.t()) + h.dot(&p.u.t()) + &p.b;

            let i = z.slice(s![.., 0..hd]).mapv(sigmoid);
            let f = z.slice(s![.., hd..2 * hd]).mapv(sigmoid);
            let g = z.slice(s![.., 2 * hd..3 * hd]).mapv(f64::tanh);
            let o = z.slice(s![.., 3 * hd..4 * hd]).mapv(sigmoid);

            let c_next = &f * &c + &i * &g;
            let tanh_c = c_next.mapv(f64::tanh);
            let h_next = &o * &tanh_c;

            if keep_cache {
                caches.push(StepCache {
                    x: x_t,
                    h_prev: h,
                    c_prev: c,
                    i,
                    f,
                    g,
                    o,
                    tanh_c,
                });
            }
            h = h_next;
            c = c_next;
        }

        let output = h.dot(&p.v.t()) + &p.c;
        (output, caches)
    }

    /// Gradients of the batch MSE with respect to every parameter
    fn backward(
        &self,
        caches: &[StepCache],
        output: &Array2<f64>,
        targets: &Array2<f64>,
    ) -> LstmParams {
        let hd = self.hidden_size;
        let p = &self.params;
        let mut grads = LstmParams::zeros_like(p);

        let Some(last) = caches.last() else {
            return grads;
        };
        let h_last = &last.o * &last.tanh_c;

        let d_out = (output - targets) * (2.0 / output.len() as f64);
        grads.v = d_out.t().dot(&h_last);
        grads.c = d_out.sum_axis(Axis(0));

        let mut dh = d_out.dot(&p.v);
        let mut dc = Array2::<f64>::zeros(dh.raw_dim());
        let mut dz = Array2::<f64>::zeros((dh.nrows(), 4 * hd));

        for step in caches.iter().rev() {
            let d_o = &dh * &step.tanh_c;
            dc = dc + &dh * &step.o * &step.tanh_c.mapv(|t| 1.0 - t * t);

            let d_i = &dc * &step.g;
            let d_g = &dc * &step.i;
            let d_f = &dc * &step.c_prev;

            dz.slice_mut(s![.., 0..hd])
                .assign(&(d_i * &step.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![.., hd..2 * hd])
                .assign(&(d_f * &step.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![.., 2 * hd..3 * hd])
                .assign(&(d_g * &step.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![.., 3 * hd..4 * hd])
                .assign(&(d_o * &step.o.mapv(|v| v * (1.0 - v))));

            grads.w += &dz.t().dot(&step.x);
            grads.u += &dz.t().dot(&step.h_prev);
            grads.b += &dz.sum_axis(Axis(0));

            dh = dz.dot(&p.u);
            dc = dc * &step.f;
        }

        grads
    }

    fn train_batch(&mut self, x: &Array3<f64>, y: &Array2<f64>) -> f64 {
        let (output, caches) = self.forward(&x.view(), true);
        let loss = mse(&output, y);
        let mut grads = self.backward(&caches, &output, y);

        if let Some(clip) = self.gradient_clip {
            let norm = grads.norm();
            if norm > clip {
                grads.scale(clip / norm);
            }
        }

        self.optimizer
            .update(&mut self.params, &grads, self.learning_rate);
        loss
    }
}

impl SequenceModel for LstmRegressor {
    fn build(input_len: usize, output_len: usize, config: &ForecasterConfig) -> Result<Self> {
        config.validate()?;
        if input_len == 0 || output_len == 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Model widths must be positive, got {} inputs and {} outputs",
                input_len, output_len
            )));
        }

        let hidden_size = config.resolved_hidden_size(input_len);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let params = LstmParams::init(hidden_size, output_len, &mut rng);
        let optimizer = Adam::new(&params);

        Ok(Self {
            name: format!("LSTM({}) -> Dense({})", hidden_size, output_len),
            input_len,
            output_len,
            hidden_size,
            learning_rate: config.learning_rate,
            batch_size: config.batch_size,
            gradient_clip: config.gradient_clip,
            params,
            optimizer,
            rng,
            loss_history: Vec::new(),
        })
    }

    fn fit(&mut self, inputs: &Array3<f64>, targets: &Array2<f64>, epochs: usize) -> Result<()> {
        check_inputs(inputs, self.input_len)?;
        check_targets(targets, inputs.shape()[0], self.output_len)?;

        let samples = inputs.shape()[0];
        let mut order: Vec<usize> = (0..samples).collect();

        for epoch in 0..epochs {
            order.shuffle(&mut self.rng);

            let mut epoch_loss = 0.0;
            let mut batches = 0;
            for chunk in order.chunks(self.batch_size) {
                let x = inputs.select(Axis(0), chunk);
                let y = targets.select(Axis(0), chunk);
                epoch_loss += self.train_batch(&x, &y);
                batches += 1;
            }

            let avg_loss = epoch_loss / batches as f64;
            if !avg_loss.is_finite() {
                return Err(ForecastError::ModelError(format!(
                    "Training diverged at epoch {}",
                    epoch + 1
                )));
            }
            self.loss_history.push(avg_loss);
            debug!(epoch = epoch + 1, epochs, loss = avg_loss, "lstm epoch finished");
        }

        Ok(())
    }

    fn predict(&self, inputs: &Array3<f64>) -> Result<Array2<f64>> {
        check_inputs(inputs, self.input_len)?;
        let (output, _) = self.forward(&inputs.view(), false);
        Ok(output)
    }

    fn input_len(&self) -> usize {
        self.input_len
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn sigmoid(v: f64) -> f64 {
    1.0 / (1.0 + (-v).exp())
}

fn mse(predictions: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    (predictions - targets).mapv(|d| d * d).mean().unwrap_or(0.0)
}
