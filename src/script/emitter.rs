//! Script Emitter
//!
//! Walks the visible layers in `tick_start` order and turns each one into a
//! block of script lines using the single animation strategy resolved from
//! the mode flags.
//!
//! ## Per-layer atomicity
//!
//! Each layer is built into its own buffer against a copy of the running
//! state (rainbow hue, proximity command count). The buffer and the state
//! are committed together only when the whole layer succeeded. A layer that
//! faults, for example on a non-finite coordinate, contributes nothing and
//! is reported as a [`CompileWarning::LayerSkipped`].
//!
//! ## Progress
//!
//! Two independent streams: [`Progress::Processing`] after every layer
//! (fraction of elements handled) and [`Progress::Writing`] while the final
//! text is assembled (fraction of lines written, every 100 lines and at the
//! last one).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::command::{
    comment_line, delay_line, header_lines, CommandKind, CommandTemplate,
    PERSISTENT_CLOUD_DURATION,
};
use super::optimizer::optimize_lines;
use super::options::{Animation, CompileOptions, ProximitySettings};
use crate::color::RainbowCycle;
use crate::error::{FxError, Result};
use crate::geometry::{
    orbit, proximity_order, rise_heights, rotate_about_origin, FramePlan, RiseAccumulator,
    MAX_RISE_STEPS, RISE_STEP_DELAY,
};
use crate::scene::{Element, Layer};

/// Lines written between writing-progress reports and cancellation checks.
pub const WRITE_BATCH: usize = 100;

/// Progress report from a running compilation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Fraction of elements processed across all compiled layers.
    Processing(f64),
    /// Fraction of output lines written.
    Writing(f64),
}

/// Non-fatal problem found while compiling.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileWarning {
    /// Rise was requested with a speed or limit that is not positive, or
    /// so slow it would take more than `MAX_RISE_STEPS` steps.
    RiseDisabled { speed: f64, limit: f64 },
    /// A layer faulted and none of its lines were written.
    LayerSkipped { layer: String, reason: String },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::RiseDisabled { speed, limit } => write!(
                f,
                "rise disabled: speed ({}) and limit ({}) must be positive and reach the limit within {} steps",
                speed, limit, MAX_RISE_STEPS
            ),
            CompileWarning::LayerSkipped { layer, reason } => {
                write!(f, "layer '{}' skipped: {}", layer, reason)
            }
        }
    }
}

/// Result of a compilation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompileOutput {
    /// The script, one line per `\n`, newline terminated.
    pub script: String,
    pub line_count: usize,
    pub warnings: Vec<CompileWarning>,
}

impl CompileOutput {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.script.lines()
    }

    /// Lines that are particle or cloud commands.
    pub fn command_count(&self) -> usize {
        self.lines()
            .filter(|l| {
                l.starts_with("  - effect:particles") || l.starts_with("  - summonareaeffectcloud")
            })
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Fail on the first skipped layer, for callers that treat a partial
    /// script as an error.
    pub fn check_faults(&self) -> Result<()> {
        for warning in &self.warnings {
            if let CompileWarning::LayerSkipped { layer, reason } = warning {
                return Err(FxError::EmissionFault {
                    layer: layer.clone(),
                    reason: reason.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Running state shared by all layers of one compilation.
#[derive(Debug, Clone, Copy)]
struct EmitState {
    rainbow: Option<RainbowCycle>,
    /// Commands emitted in proximity mode so far, across layers.
    effect_count: u64,
}

impl EmitState {
    fn new(rainbow: bool) -> Self {
        Self {
            rainbow: rainbow.then(RainbowCycle::new),
            effect_count: 0,
        }
    }
}

/// Builds the block for one layer.
struct LayerEmitter<'l> {
    layer: &'l Layer,
    template: CommandTemplate,
    state: &'l mut EmitState,
    block: Vec<String>,
}

impl<'l> LayerEmitter<'l> {
    fn new(layer: &'l Layer, template: CommandTemplate, state: &'l mut EmitState) -> Self {
        Self {
            layer,
            template,
            state,
            block: vec![comment_line(&layer.name)],
        }
    }

    fn delay(&mut self, ticks: impl fmt::Display) {
        self.block.push(delay_line(ticks));
    }

    fn command(&mut self, index: usize, element: &Element, x: f64, z: f64, y: f64) -> Result<()> {
        if !(x.is_finite() && z.is_finite() && y.is_finite()) {
            return Err(FxError::NonFiniteCoordinate {
                layer: self.layer.name.clone(),
                element: index,
            });
        }
        let color = match self.state.rainbow.as_mut() {
            Some(cycle) => cycle.next_color(),
            None => element.effective_color(&self.layer.color).to_string(),
        };
        self.block.push(self.template.render(&color, x, z, y));
        Ok(())
    }

    fn finish(self) -> Vec<String> {
        self.block
    }
}

/// Effect script compiler.
///
/// ```ignore
/// let output = Compiler::new(&options)
///     .with_progress(|p| println!("{:?}", p))
///     .compile(&scene.snapshot())?;
/// ```
pub struct Compiler<'a> {
    options: &'a CompileOptions,
    cancel: Option<&'a AtomicBool>,
    progress: Option<Box<dyn FnMut(Progress) + 'a>>,
}

impl<'a> Compiler<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            cancel: None,
            progress: None,
        }
    }

    /// Stop at the next layer or write batch once `flag` is set.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_progress(mut self, callback: impl FnMut(Progress) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Compile `layers` into a script.
    ///
    /// Fails only on cancellation; layer faults become warnings.
    pub fn compile(mut self, layers: &[Layer]) -> Result<CompileOutput> {
        let options = self.options;
        let modes = &options.modes;
        let animation = modes.animation();
        let mut warnings = Vec::new();

        if modes.rise_disabled() {
            let warning = CompileWarning::RiseDisabled {
                speed: modes.rise.speed,
                limit: modes.rise.limit,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        let mut ordered: Vec<&Layer> = layers
            .iter()
            .filter(|l| l.visible && !l.is_empty())
            .collect();
        ordered.sort_by_key(|l| l.tick_start);
        let total_elements: usize = ordered.iter().map(|l| l.len()).sum();

        debug!(
            layers = ordered.len(),
            elements = total_elements,
            ?animation,
            "compiling"
        );

        let mut lines: Vec<String> = header_lines(options.resolved_skill_name()).into();
        let mut state = EmitState::new(modes.rainbow);
        let mut processed = 0usize;

        for layer in ordered {
            self.check_cancelled()?;

            let mut next = state;
            match self.emit_layer(layer, animation, &mut next) {
                Ok(block) => {
                    debug!(layer = %layer.name, lines = block.len(), "layer emitted");
                    lines.extend(block);
                    state = next;
                }
                Err(e) => {
                    warn!(layer = %layer.name, error = %e, "layer skipped");
                    warnings.push(CompileWarning::LayerSkipped {
                        layer: layer.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            processed += layer.len();
            self.report(Progress::Processing(processed as f64 / total_elements as f64));
        }

        if modes.performance {
            let before = lines.len();
            lines = optimize_lines(&lines);
            debug!(before, after = lines.len(), "lines optimized");
        }

        let script = self.write(&lines)?;
        info!(
            lines = lines.len(),
            warnings = warnings.len(),
            "script compiled"
        );

        Ok(CompileOutput {
            script,
            line_count: lines.len(),
            warnings,
        })
    }

    fn emit_layer(
        &self,
        layer: &Layer,
        animation: Animation,
        state: &mut EmitState,
    ) -> Result<Vec<String>> {
        let layer_y = layer.y_offset + self.options.global_y_offset;
        let kind = match animation {
            Animation::Persistent => CommandKind::Cloud {
                duration: PERSISTENT_CLOUD_DURATION,
            },
            _ => CommandKind::from(self.options.effect_kind),
        };
        let mut out = LayerEmitter::new(layer, CommandTemplate::for_layer(layer, kind), state);

        match animation {
            Animation::GlobalRotation { speed, rise } => {
                let plan = FramePlan::for_speed(speed);
                let angle_step = plan.angle_step();
                let mut lift = rise.map(|(speed, limit)| RiseAccumulator::new(speed, limit));

                for frame in 0..plan.frames {
                    out.delay(plan.delay_text());
                    let theta = frame as f64 * angle_step;
                    let bias = lift.map_or(0.0, |r| r.current());
                    for (i, el) in layer.elements.iter().enumerate() {
                        let p = rotate_about_origin(el.position, theta);
                        out.command(i, el, p.x, p.z, el.y_offset + layer_y + bias)?;
                    }
                    if let Some(lift) = lift.as_mut() {
                        lift.advance();
                    }
                }
            }

            Animation::LocalRotation { radius, speed } => {
                let plan = FramePlan::for_speed(speed);
                for frame in 0..plan.frames {
                    out.delay(plan.delay_text());
                    for (i, el) in layer.elements.iter().enumerate() {
                        let p = orbit(el.position, radius, speed, frame);
                        out.command(i, el, p.x, p.z, el.y_offset + layer_y)?;
                    }
                }
            }

            // Height replaces both the element and the layer offset here.
            Animation::Rise { speed, limit } => {
                for height in rise_heights(speed, limit).into_iter().flatten() {
                    out.delay(RISE_STEP_DELAY);
                    for (i, el) in layer.elements.iter().enumerate() {
                        out.command(i, el, el.position.x, el.position.z, height)?;
                    }
                }
            }

            Animation::Proximity(settings) => {
                emit_proximity(&mut out, layer, layer_y, settings)?;
            }

            Animation::Persistent => {
                for (i, el) in layer.elements.iter().enumerate() {
                    out.command(i, el, el.position.x, el.position.z, el.y_offset + layer_y)?;
                }
            }

            Animation::Single => {
                out.delay(layer.tick_start);
                for (i, el) in layer.elements.iter().enumerate() {
                    out.command(i, el, el.position.x, el.position.z, el.y_offset + layer_y)?;
                }
            }
        }

        Ok(out.finish())
    }

    /// Assemble the final text, reporting writing progress.
    fn write(&mut self, lines: &[String]) -> Result<String> {
        let total = lines.len();
        let mut script = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());

        for (idx, line) in lines.iter().enumerate() {
            if idx % WRITE_BATCH == 0 {
                self.check_cancelled()?;
            }
            script.push_str(line);
            script.push('\n');
            if idx % WRITE_BATCH == 0 || idx + 1 == total {
                self.report(Progress::Writing((idx + 1) as f64 / total as f64));
            }
        }
        Ok(script)
    }

    fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => {
                info!("compilation cancelled");
                Err(FxError::Cancelled)
            }
            _ => Ok(()),
        }
    }

    fn report(&mut self, progress: Progress) {
        if let Some(callback) = self.progress.as_mut() {
            callback(progress);
        }
    }
}

/// Tour order, with a delay after every `step` commands. The command count
/// runs across layers.
fn emit_proximity(
    out: &mut LayerEmitter<'_>,
    layer: &Layer,
    layer_y: f64,
    settings: ProximitySettings,
) -> Result<()> {
    for i in proximity_order(&layer.elements) {
        let el = &layer.elements[i];
        out.command(i, el, el.position.x, el.position.z, el.y_offset + layer_y)?;
        out.state.effect_count += 1;
        if settings.delay_due(out.state.effect_count) {
            out.delay(settings.delay_ticks);
        }
    }
    Ok(())
}

/// Compile with no progress reporting and no cancellation.
pub fn compile(layers: &[Layer], options: &CompileOptions) -> Result<CompileOutput> {
    Compiler::new(options).compile(layers)
}
