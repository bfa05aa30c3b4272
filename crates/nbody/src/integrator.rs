//! Orbital integrators for the point-mass system
//!
//! The coupling layer treats the integrator as a black box: the bodies are
//! copied into an [`IntegratorState`] mirror, the integrator is asked to reach
//! an absolute target time, and the mirror is copied back. Anything that
//! implements [`OrbitalIntegrator`] can be swapped in.

use log::error;
use nalgebra::{Point2, Vector2};

use crate::error::IntegrationError;
use crate::forces::{DirectGravity, ForceModel};

/// Mirrored state of one body as seen by the integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorParticle {
    pub mass: f64,
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
    pub feels_others: bool,
}

impl MirrorParticle {
    pub fn new(mass: f64, position: [f64; 2], velocity: [f64; 2]) -> Self {
        Self {
            mass,
            position: Point2::new(position[0], position[1]),
            velocity: Vector2::new(velocity[0], velocity[1]),
            feels_others: true,
        }
    }
}

/// Integrator-owned copy of the system, sized to the body count
#[derive(Debug, Clone, Default)]
pub struct IntegratorState {
    pub time: f64,
    pub particles: Vec<MirrorParticle>,
}

impl IntegratorState {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.particles
            .iter()
            .map(|p| 0.5 * p.mass * p.velocity.magnitude_squared())
            .sum()
    }

    pub fn total_momentum(&self) -> Vector2<f64> {
        self.particles
            .iter()
            .map(|p| p.velocity * p.mass)
            .fold(Vector2::zeros(), |acc, p| acc + p)
    }

    fn is_finite(&self) -> bool {
        self.particles.iter().all(|p| {
            p.position.x.is_finite()
                && p.position.y.is_finite()
                && p.velocity.x.is_finite()
                && p.velocity.y.is_finite()
        })
    }
}

/// Capability interface of an external orbital integrator
///
/// `advance` must leave `state.time == target_time` on success. On failure the
/// state is unspecified and the caller must not copy it back.
pub trait OrbitalIntegrator: Send + Sync {
    fn advance(&mut self, state: &mut IntegratorState, target_time: f64)
    -> Result<(), IntegrationError>;

    fn name(&self) -> &'static str;
}

fn check_target(state: &IntegratorState, target_time: f64) -> Result<f64, IntegrationError> {
    let span = target_time - state.time;
    if span < 0.0 {
        return Err(IntegrationError::TargetInPast {
            current: state.time,
            target: target_time,
        });
    }
    Ok(span)
}

// =============================================================================
// Leapfrog
// =============================================================================

/// Symplectic leapfrog integrator (2nd order, kick-drift-kick)
///
/// The interval to the target time is split into the smallest number of
/// equal steps not exceeding `max_dt`, so the integrator always lands
/// exactly on the requested time.
///
/// # Examples
///
/// ```
/// use nbody::integrator::{IntegratorState, Leapfrog, MirrorParticle, OrbitalIntegrator};
///
/// let mut state = IntegratorState {
///     time: 0.0,
///     particles: vec![
///         MirrorParticle::new(1.0, [0.0, 0.0], [0.0, 0.0]),
///         MirrorParticle::new(1.0e-3, [1.0, 0.0], [0.0, 1.0]),
///     ],
/// };
///
/// let mut leapfrog = Leapfrog::new(1.0e-3);
/// leapfrog.advance(&mut state, 0.1).unwrap();
/// assert_eq!(state.time, 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct Leapfrog<F: ForceModel = DirectGravity> {
    pub max_dt: f64,
    force: F,
    accel: Vec<Vector2<f64>>,
}

impl Leapfrog<DirectGravity> {
    pub fn new(max_dt: f64) -> Self {
        Self::with_force(max_dt, DirectGravity)
    }
}

impl<F: ForceModel> Leapfrog<F> {
    pub fn with_force(max_dt: f64, force: F) -> Self {
        Self {
            max_dt,
            force,
            accel: Vec::new(),
        }
    }

    fn kick(&mut self, state: &mut IntegratorState, dt_half: f64) {
        self.force.accelerations(&state.particles, &mut self.accel);
        state
            .particles
            .iter_mut()
            .zip(self.accel.iter())
            .for_each(|(p, a)| p.velocity += a * dt_half);
    }

    fn drift(&self, state: &mut IntegratorState, dt: f64) {
        state
            .particles
            .iter_mut()
            .for_each(|p| p.position += p.velocity * dt);
    }
}

impl<F: ForceModel> OrbitalIntegrator for Leapfrog<F> {
    fn advance(
        &mut self,
        state: &mut IntegratorState,
        target_time: f64,
    ) -> Result<(), IntegrationError> {
        let span = check_target(state, target_time)?;
        if span == 0.0 || state.is_empty() {
            state.time = target_time;
            return Ok(());
        }

        let n_steps = (span / self.max_dt).ceil().max(1.0) as usize;
        let dt = span / n_steps as f64;
        self.accel.resize(state.len(), Vector2::zeros());

        for _ in 0..n_steps {
            self.kick(state, 0.5 * dt);
            self.drift(state, dt);
            self.kick(state, 0.5 * dt);
            state.time += dt;
        }
        state.time = target_time;

        if !state.is_finite() {
            error!("leapfrog produced a non-finite state at t = {target_time}");
            return Err(IntegrationError::NonFinite { time: target_time });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "leapfrog"
    }
}

// =============================================================================
// Cash-Karp embedded Runge-Kutta 4(5)
// =============================================================================

// Stage times are not needed: the force model is time independent.
const B: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [3.0 / 10.0, -9.0 / 10.0, 6.0 / 5.0, 0.0, 0.0],
    [-11.0 / 54.0, 5.0 / 2.0, -70.0 / 27.0, 35.0 / 27.0, 0.0],
    [
        1631.0 / 55296.0,
        175.0 / 512.0,
        575.0 / 13824.0,
        44275.0 / 110592.0,
        253.0 / 4096.0,
    ],
];
const C5: [f64; 6] = [37.0 / 378.0, 0.0, 250.0 / 621.0, 125.0 / 594.0, 0.0, 512.0 / 1771.0];
const C4: [f64; 6] = [
    2825.0 / 27648.0,
    0.0,
    18575.0 / 48384.0,
    13525.0 / 55296.0,
    277.0 / 14336.0,
    1.0 / 4.0,
];

/// Adaptive embedded Runge-Kutta integrator with Cash-Karp coefficients
///
/// The local error of each step is estimated from the embedded 4th order
/// solution and kept below `abs_tol + rel_tol·|y|` per component. A step size
/// that underflows, or more than `max_steps` attempted steps for one
/// `advance` call, is reported as a convergence failure.
#[derive(Debug, Clone)]
pub struct CashKarp<F: ForceModel = DirectGravity> {
    pub abs_tol: f64,
    pub rel_tol: f64,
    pub max_steps: usize,
    force: F,
    /// Step size carried over between calls
    dt_hint: Option<f64>,
}

impl CashKarp<DirectGravity> {
    pub fn new(tolerance: f64) -> Self {
        Self::with_force(tolerance, DirectGravity)
    }
}

impl<F: ForceModel> CashKarp<F> {
    pub fn with_force(tolerance: f64, force: F) -> Self {
        Self {
            abs_tol: tolerance,
            rel_tol: tolerance,
            max_steps: 1_000_000,
            force,
            dt_hint: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Flattened [x, y, vx, vy] per particle
    fn pack(state: &IntegratorState) -> Vec<f64> {
        state
            .particles
            .iter()
            .flat_map(|p| [p.position.x, p.position.y, p.velocity.x, p.velocity.y])
            .collect()
    }

    fn unpack(y: &[f64], state: &mut IntegratorState) {
        for (p, chunk) in state.particles.iter_mut().zip(y.chunks_exact(4)) {
            p.position = Point2::new(chunk[0], chunk[1]);
            p.velocity = Vector2::new(chunk[2], chunk[3]);
        }
    }

    fn derivatives(
        &self,
        y: &[f64],
        scratch: &mut IntegratorState,
        accel: &mut [Vector2<f64>],
        dydt: &mut [f64],
    ) {
        Self::unpack(y, scratch);
        self.force.accelerations(&scratch.particles, accel);
        for ((d, s), a) in dydt.chunks_exact_mut(4).zip(y.chunks_exact(4)).zip(accel.iter()) {
            d[0] = s[2];
            d[1] = s[3];
            d[2] = a.x;
            d[3] = a.y;
        }
    }

    /// One trial step; returns the 5th order solution and the error norm
    fn trial_step(
        &self,
        y: &[f64],
        dt: f64,
        scratch: &mut IntegratorState,
        accel: &mut [Vector2<f64>],
        k: &mut [Vec<f64>; 6],
    ) -> (Vec<f64>, f64) {
        let n = y.len();
        let mut stage = vec![0.0; n];

        for s in 0..6 {
            for (idx, value) in stage.iter_mut().enumerate() {
                let increment: f64 = (0..s).map(|r| B[s][r] * k[r][idx]).sum();
                *value = y[idx] + dt * increment;
            }
            self.derivatives(&stage, scratch, accel, &mut k[s]);
        }

        let mut y_new = vec![0.0; n];
        let mut err_norm: f64 = 0.0;
        for idx in 0..n {
            let high: f64 = (0..6).map(|s| C5[s] * k[s][idx]).sum();
            let low: f64 = (0..6).map(|s| C4[s] * k[s][idx]).sum();
            y_new[idx] = y[idx] + dt * high;
            let err = dt * (high - low);
            let scale = self.abs_tol + self.rel_tol * y[idx].abs().max(y_new[idx].abs());
            err_norm = err_norm.max(err.abs() / scale);
        }
        (y_new, err_norm)
    }
}

impl<F: ForceModel> OrbitalIntegrator for CashKarp<F> {
    fn advance(
        &mut self,
        state: &mut IntegratorState,
        target_time: f64,
    ) -> Result<(), IntegrationError> {
        let span = check_target(state, target_time)?;
        if span == 0.0 || state.is_empty() {
            state.time = target_time;
            return Ok(());
        }

        let mut y = Self::pack(state);
        let mut scratch = state.clone();
        let mut accel = vec![Vector2::zeros(); state.len()];
        let mut k: [Vec<f64>; 6] = std::array::from_fn(|_| vec![0.0; y.len()]);

        let mut t = state.time;
        let mut dt = self.dt_hint.unwrap_or(span).min(span);
        let mut attempts = 0;

        while t < target_time {
            if attempts >= self.max_steps {
                error!("cash-karp exhausted {} steps at t = {t}", self.max_steps);
                return Err(IntegrationError::StepBudgetExhausted {
                    time: t,
                    steps: attempts,
                });
            }
            attempts += 1;

            let remaining = target_time - t;
            let last = dt >= remaining;
            let h = if last { remaining } else { dt };

            if h <= f64::EPSILON * t.abs().max(1.0) && !last {
                error!("cash-karp step size underflow (dt = {h:e}) at t = {t}");
                return Err(IntegrationError::StepSizeUnderflow { time: t, dt: h });
            }

            let (y_new, err_norm) = self.trial_step(&y, h, &mut scratch, &mut accel, &mut k);
            if !err_norm.is_finite() {
                error!("cash-karp produced a non-finite state at t = {t}");
                return Err(IntegrationError::NonFinite { time: t });
            }

            if err_norm <= 1.0 {
                y = y_new;
                t = if last { target_time } else { t + h };
                let growth = if err_norm == 0.0 {
                    5.0
                } else {
                    (0.9 * err_norm.powf(-0.2)).clamp(0.2, 5.0)
                };
                if !last {
                    dt = h * growth;
                } else {
                    dt = dt.max(h * growth);
                }
            } else {
                dt = h * (0.9 * err_norm.powf(-0.25)).max(0.1);
                if dt <= f64::EPSILON * t.abs().max(1.0) {
                    error!("cash-karp step size underflow (dt = {dt:e}) at t = {t}");
                    return Err(IntegrationError::StepSizeUnderflow { time: t, dt });
                }
            }
        }

        self.dt_hint = Some(dt);
        Self::unpack(&y, state);
        state.time = target_time;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cash-karp"
    }
}
