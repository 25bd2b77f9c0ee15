//! Per-worker real-transform workspace.
//!
//! One [`NccWorkspace`] holds every scratch buffer a single channel's worth of
//! FFT-NCC work touches. Workspaces are allocated once per orchestrator call,
//! one per worker, and reused across every channel that worker is assigned.

use num_complex::Complex32;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::error::NccError;
use crate::shapes::NccShape;

/// The forward/inverse real-FFT plans shared read-only across all workers.
///
/// `Pa` (batched template transform) and `Pb` (image transform) from the
/// design are the same transform length and therefore the same plan object:
/// the "batch" over templates is realised as this one plan invoked once per
/// template row (see the workspace design notes), so there is nothing a
/// second, distinct `Pa` plan would buy over reusing `forward` per row.
pub struct NccPlans {
    pub forward: Arc<dyn RealToComplex<f32>>,
    pub inverse: Arc<dyn ComplexToReal<f32>>,
}

impl NccPlans {
    /// Build the forward/inverse plan pair for one orchestrator call.
    ///
    /// Plan construction is not thread-safe and must happen before any
    /// parallel region starts; the resulting `Arc`s are then shared
    /// read-only across every worker's workspace.
    pub fn new(transform_len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(transform_len);
        let inverse = planner.plan_fft_inverse(transform_len);
        Self { forward, inverse }
    }
}

/// Scratch buffers for one worker, sized for one orchestrator call's shape.
pub struct NccWorkspace {
    /// `L_f * n_templates`, time-reversed zero-padded templates, row-major.
    pub template_ext: Vec<f32>,
    /// `L_f`, zero-padded image.
    pub image_ext: Vec<f32>,
    /// `L_f * n_templates`, inverse-transform output, row-major.
    pub ccc: Vec<f32>,
    /// `spectrum_len * n_templates`, forward transform of templates, row-major.
    pub outa: Vec<Complex32>,
    /// `spectrum_len`, forward transform of the image.
    pub outb: Vec<Complex32>,
    /// `spectrum_len * n_templates`, pointwise product, row-major.
    pub out: Vec<Complex32>,
    fwd_scratch: Vec<Complex32>,
    inv_scratch: Vec<Complex32>,
}

impl NccWorkspace {
    pub fn allocate(shape: &NccShape, plans: &NccPlans) -> Result<Self, NccError> {
        let spectrum_len = shape.spectrum_len();
        let n_templates = shape.n_templates.max(1);
        let fwd_scratch_len = plans.forward.get_scratch_len();
        let inv_scratch_len = plans.inverse.get_scratch_len();

        Ok(Self {
            template_ext: vec![0.0f32; shape.transform_len * n_templates],
            image_ext: vec![0.0f32; shape.transform_len],
            ccc: vec![0.0f32; shape.transform_len * n_templates],
            outa: vec![Complex32::new(0.0, 0.0); spectrum_len * n_templates],
            outb: vec![Complex32::new(0.0, 0.0); spectrum_len],
            out: vec![Complex32::new(0.0, 0.0); spectrum_len * n_templates],
            fwd_scratch: vec![Complex32::new(0.0, 0.0); fwd_scratch_len],
            inv_scratch: vec![Complex32::new(0.0, 0.0); inv_scratch_len],
        })
    }

    /// Zero the two real input buffers ahead of one channel's Phase 1 setup.
    pub fn clear_inputs(&mut self) {
        self.template_ext.iter_mut().for_each(|v| *v = 0.0);
        self.image_ext.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Forward-transform one template row in place: `template_ext[row] -> outa[row]`.
    pub fn forward_template_row(
        &mut self,
        plans: &NccPlans,
        row: usize,
        transform_len: usize,
        spectrum_len: usize,
    ) -> Result<(), NccError> {
        let t_start = row * transform_len;
        let s_start = row * spectrum_len;
        plans
            .forward
            .process_with_scratch(
                &mut self.template_ext[t_start..t_start + transform_len],
                &mut self.outa[s_start..s_start + spectrum_len],
                &mut self.fwd_scratch,
            )
            .map_err(|_| NccError::AllocationFailed {
                context: "forward template transform",
            })
    }

    /// Forward-transform the image: `image_ext -> outb`.
    pub fn forward_image(&mut self, plans: &NccPlans) -> Result<(), NccError> {
        plans
            .forward
            .process_with_scratch(&mut self.image_ext, &mut self.outb, &mut self.fwd_scratch)
            .map_err(|_| NccError::AllocationFailed {
                context: "forward image transform",
            })
    }

    /// Inverse-transform one row of the pointwise product: `out[row] -> ccc[row]`.
    pub fn inverse_row(
        &mut self,
        plans: &NccPlans,
        row: usize,
        transform_len: usize,
        spectrum_len: usize,
    ) -> Result<(), NccError> {
        let t_start = row * transform_len;
        let s_start = row * spectrum_len;
        plans
            .inverse
            .process_with_scratch(
                &mut self.out[s_start..s_start + spectrum_len],
                &mut self.ccc[t_start..t_start + transform_len],
                &mut self.inv_scratch,
            )
            .map_err(|_| NccError::AllocationFailed {
                context: "inverse transform",
            })
    }
}
