//! Reverse-mode gradients of the complex network on candle.
//!
//! candle has no complex dtype, so every complex tensor is carried as a pair
//! of `f64` planes. The loss is holomorphic in every parameter, which means
//! its derivative is recovered from the gradient of the real part alone:
//! for `w = a + ib`, `dL/dw = ∂Re(L)/∂a − i·∂Re(L)/∂b`.

use candle_core::backprop::GradStore;
use candle_core::{Device, Tensor, Var};
use num_complex::Complex64;
use phasenet_core::Result;

use crate::data::ExpandedDataset;
use crate::params::{ComplexTensor, Parameters};

/// Computes the loss and its gradient for the current parameters.
pub trait GradientEngine {
    /// Output heads wired into the graph.
    fn heads(&self) -> usize;

    /// One forward and backward pass over the whole batch.
    ///
    /// Adds `dL/dw` into every gradient buffer of `params` and returns `L`.
    /// Callers zero the buffers first.
    fn forward_backward(&mut self, params: &mut Parameters) -> Result<Complex64>;
}

/// Real and imaginary planes of one complex tensor.
#[derive(Debug, Clone)]
struct Planes {
    re: Tensor,
    im: Tensor,
}

impl Planes {
    fn from_complex(
        values: &[Complex64],
        shape: &[usize],
        device: &Device,
    ) -> candle_core::Result<Self> {
        let re: Vec<f64> = values.iter().map(|c| c.re).collect();
        let im: Vec<f64> = values.iter().map(|c| c.im).collect();
        Ok(Self {
            re: Tensor::from_vec(re, shape.to_vec(), device)?,
            im: Tensor::from_vec(im, shape.to_vec(), device)?,
        })
    }

    /// `self · wᵀ` for a batch of rows.
    fn matmul_t(&self, w: &Planes) -> candle_core::Result<Self> {
        let w_re = w.re.t()?;
        let w_im = w.im.t()?;
        let re = self.re.matmul(&w_re)?.sub(&self.im.matmul(&w_im)?)?;
        let im = self.re.matmul(&w_im)?.add(&self.im.matmul(&w_re)?)?;
        Ok(Self { re, im })
    }

    fn broadcast_add(&self, bias: &Planes) -> candle_core::Result<Self> {
        Ok(Self {
            re: self.re.broadcast_add(&bias.re)?,
            im: self.im.broadcast_add(&bias.im)?,
        })
    }

    fn sub(&self, other: &Planes) -> candle_core::Result<Self> {
        Ok(Self {
            re: self.re.sub(&other.re)?,
            im: self.im.sub(&other.im)?,
        })
    }

    /// `1 / (1 + e^{-z})`.
    fn sigmoid(&self) -> candle_core::Result<Self> {
        // e^{-z} = e^{-x} (cos y − i sin y), so 1 + e^{-z} = p + iq.
        let decay = self.re.neg()?.exp()?;
        let p = decay.mul(&self.im.cos()?)?.affine(1.0, 1.0)?;
        let q = decay.mul(&self.im.sin()?)?.neg()?;
        let denom = p.sqr()?.add(&q.sqr()?)?;
        Ok(Self {
            re: p.div(&denom)?,
            im: q.neg()?.div(&denom)?,
        })
    }

    /// Complex square, not the squared magnitude.
    fn square(&self) -> candle_core::Result<Self> {
        Ok(Self {
            re: self.re.sqr()?.sub(&self.im.sqr()?)?,
            im: self.re.mul(&self.im)?.affine(2.0, 0.0)?,
        })
    }
}

/// A trainable complex tensor as two candle variables.
struct ParamVars {
    re: Var,
    im: Var,
}

impl ParamVars {
    fn new(t: &ComplexTensor, device: &Device) -> candle_core::Result<Self> {
        let planes = Planes::from_complex(&t.values, t.shape(), device)?;
        Ok(Self {
            re: Var::from_tensor(&planes.re)?,
            im: Var::from_tensor(&planes.im)?,
        })
    }

    fn sync(&self, t: &ComplexTensor, device: &Device) -> candle_core::Result<()> {
        let planes = Planes::from_complex(&t.values, t.shape(), device)?;
        self.re.set(&planes.re)?;
        self.im.set(&planes.im)
    }

    fn planes(&self) -> Planes {
        Planes {
            re: self.re.as_tensor().clone(),
            im: self.im.as_tensor().clone(),
        }
    }

    /// Adds `g_re − i·g_im` into `t.grads`. Missing gradients count as zero.
    fn accumulate(&self, grads: &GradStore, t: &mut ComplexTensor) -> candle_core::Result<()> {
        let g_re = plane_grad(grads, &self.re)?;
        let g_im = plane_grad(grads, &self.im)?;
        for (i, g) in t.grads.iter_mut().enumerate() {
            let re = g_re.as_ref().map_or(0.0, |v| v[i]);
            let im = g_im.as_ref().map_or(0.0, |v| v[i]);
            *g += Complex64::new(re, -im);
        }
        Ok(())
    }
}

fn plane_grad(grads: &GradStore, var: &Var) -> candle_core::Result<Option<Vec<f64>>> {
    grads
        .get(var.as_tensor())
        .map(|g| g.flatten_all()?.to_vec1::<f64>())
        .transpose()
}

/// The network wired up on candle with the whole batch resident.
///
/// Inputs and per-head targets are uploaded once. Parameter values are
/// copied into the variables at the start of every pass.
pub struct CandleGraph {
    device: Device,
    input: Planes,
    targets: Vec<Planes>,
    w0: ParamVars,
    b0: ParamVars,
    w1: Vec<ParamVars>,
    b1: Vec<ParamVars>,
}

impl CandleGraph {
    pub fn build(params: &Parameters, dataset: &ExpandedDataset, device: &Device) -> Result<Self> {
        let shape = [dataset.len(), dataset.width()];
        let input = Planes::from_complex(&dataset.input_buffer(), &shape, device)?;
        let targets = dataset
            .target_buffers()
            .iter()
            .take(params.heads())
            .map(|buf| Planes::from_complex(buf, &shape, device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let w1 = params
            .w1
            .iter()
            .map(|t| ParamVars::new(t, device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let b1 = params
            .b1
            .iter()
            .map(|t| ParamVars::new(t, device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        Ok(Self {
            device: device.clone(),
            input,
            targets,
            w0: ParamVars::new(&params.w0, device)?,
            b0: ParamVars::new(&params.b0, device)?,
            w1,
            b1,
        })
    }

    fn sync(&self, params: &Parameters) -> candle_core::Result<()> {
        self.w0.sync(&params.w0, &self.device)?;
        self.b0.sync(&params.b0, &self.device)?;
        for (var, t) in self.w1.iter().zip(params.w1.iter()) {
            var.sync(t, &self.device)?;
        }
        for (var, t) in self.b1.iter().zip(params.b1.iter()) {
            var.sync(t, &self.device)?;
        }
        Ok(())
    }

    /// Loss planes as scalars, summed over heads.
    fn loss(&self) -> candle_core::Result<Planes> {
        let hidden = self
            .input
            .matmul_t(&self.w0.planes())?
            .broadcast_add(&self.b0.planes())?
            .sigmoid()?;

        let mut total: Option<Planes> = None;
        for ((w1, b1), target) in self.w1.iter().zip(self.b1.iter()).zip(self.targets.iter()) {
            let out = hidden.matmul_t(&w1.planes())?.broadcast_add(&b1.planes())?;
            let sq = out.sub(target)?.square()?;
            let head = Planes {
                re: sq.re.sum(1)?.affine(0.5, 0.0)?.mean_all()?,
                im: sq.im.sum(1)?.affine(0.5, 0.0)?.mean_all()?,
            };
            total = Some(match total {
                None => head,
                Some(acc) => Planes {
                    re: acc.re.add(&head.re)?,
                    im: acc.im.add(&head.im)?,
                },
            });
        }
        match total {
            Some(t) => Ok(t),
            None => candle_core::bail!("network has no output heads"),
        }
    }
}

impl GradientEngine for CandleGraph {
    fn heads(&self) -> usize {
        self.w1.len()
    }

    fn forward_backward(&mut self, params: &mut Parameters) -> Result<Complex64> {
        self.sync(params)?;
        let loss = self.loss()?;
        let value = Complex64::new(loss.re.to_scalar::<f64>()?, loss.im.to_scalar::<f64>()?);

        let grads = loss.re.backward()?;
        self.w0.accumulate(&grads, &mut params.w0)?;
        self.b0.accumulate(&grads, &mut params.b0)?;
        for (var, t) in self.w1.iter().zip(params.w1.iter_mut()) {
            var.accumulate(&grads, t)?;
        }
        for (var, t) in self.b1.iter().zip(params.b1.iter_mut()) {
            var.accumulate(&grads, t)?;
        }
        Ok(value)
    }
}
