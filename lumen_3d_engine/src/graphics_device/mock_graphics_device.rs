/// Mock graphics device for unit tests (no GPU required)
///
/// Every recorded command is appended as a readable line to a shared log,
/// e.g. `bind_texture 1 bloom.chain.color0` or `set_uniform uGamma Float(2.2)`.
/// Shader programs get a reflection table built by scanning the GLSL
/// declarations, so named-uniform lookups behave like a linked program.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, BufferDesc, Texture, TextureDesc, TextureInfo, TextureFormat, TextureTarget,
    TextureWrap, TextureFilter, Framebuffer, FramebufferDesc, DepthAttachmentDesc,
    ShaderProgram, ShaderProgramDesc, ShaderStage, ProgramReflection, UniformLocation,
    UniformValue, VertexArray, VertexArrayDesc, VertexAttribute, CommandList, ClearFlags,
    Viewport, Rect2D, CullMode, BlendState, DrawBuffers, BlitTarget, GraphicsDevice,
    DeviceStats,
};

/// Shared command log
pub type CommandLog = Arc<Mutex<Vec<String>>>;

fn push(log: &CommandLog, line: String) {
    log.lock().unwrap().push(line);
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    pub label: String,
    size: Mutex<u64>,
}

impl MockBuffer {
    pub fn new(label: String, size: u64) -> Self {
        Self { label, size: Mutex::new(size) }
    }
}

impl Buffer for MockBuffer {
    fn label(&self) -> &str {
        &self.label
    }

    fn size(&self) -> u64 {
        *self.size.lock().unwrap()
    }

    fn allocate(&self, data: &[u8]) -> Result<()> {
        *self.size.lock().unwrap() = data.len() as u64;
        Ok(())
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let size = self.size();
        if offset + data.len() as u64 > size {
            return Err(Error::InvalidResource(format!(
                "write of {} bytes at {} overflows buffer '{}' ({} bytes)",
                data.len(), offset, self.label, size
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

pub struct MockTexture {
    pub label: String,
    pub info: TextureInfo,
    pub wrap: Mutex<(TextureWrap, TextureWrap)>,
    pub filter: Mutex<(TextureFilter, TextureFilter)>,
}

impl MockTexture {
    pub fn new(label: String, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label,
            info: TextureInfo {
                width,
                height,
                layers: 1,
                format,
                target: TextureTarget::Texture2D,
            },
            wrap: Mutex::new((TextureWrap::Repeat, TextureWrap::Repeat)),
            filter: Mutex::new((TextureFilter::Linear, TextureFilter::Linear)),
        }
    }
}

impl Texture for MockTexture {
    fn label(&self) -> &str {
        &self.label
    }

    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn set_wrap(&self, wrap_s: TextureWrap, wrap_t: TextureWrap) {
        *self.wrap.lock().unwrap() = (wrap_s, wrap_t);
    }

    fn set_filter(&self, min: TextureFilter, mag: TextureFilter) {
        *self.filter.lock().unwrap() = (min, mag);
    }

    fn update(&self, data: &[u8]) -> Result<()> {
        let expected = (self.info.width * self.info.height * self.info.format.bytes_per_pixel()) as usize;
        if data.len() != expected {
            return Err(Error::InvalidResource(format!(
                "texture '{}' expects {} bytes, got {}",
                self.label, expected, data.len()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Mock Framebuffer
// ============================================================================

pub struct MockFramebuffer {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub colors: Vec<Arc<dyn Texture>>,
    pub depth: Option<Arc<dyn Texture>>,
}

impl Framebuffer for MockFramebuffer {
    fn label(&self) -> &str {
        &self.label
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn color_attachments(&self) -> &[Arc<dyn Texture>] {
        &self.colors
    }

    fn depth_attachment(&self) -> Option<&Arc<dyn Texture>> {
        self.depth.as_ref()
    }
}

// ============================================================================
// Mock ShaderProgram
// ============================================================================

pub struct MockShaderProgram {
    pub label: String,
    pub reflection: ProgramReflection,
}

impl ShaderProgram for MockShaderProgram {
    fn label(&self) -> &str {
        &self.label
    }

    fn reflection(&self) -> &ProgramReflection {
        &self.reflection
    }
}

/// Build a reflection table from GLSL declarations
///
/// Understands `uniform <type> <name>;`, `uniform <type> <name>[N];`,
/// `... uniform <Block> {` and `layout (location = N) in <type> <name>;`.
pub fn reflect_sources(sources: &[&str]) -> ProgramReflection {
    let mut uniforms = FxHashMap::default();
    let mut blocks = FxHashMap::default();
    let mut attributes = FxHashMap::default();
    let mut next_location = 0;

    for source in sources {
        for line in source.lines() {
            let line = line.trim();
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let uniform_pos = tokens.iter().position(|t| *t == "uniform");

            if let Some(pos) = uniform_pos {
                if line.ends_with('{') {
                    if let Some(name) = tokens.get(pos + 1) {
                        let index = blocks.len() as u32;
                        blocks.entry(name.to_string()).or_insert(index);
                    }
                    continue;
                }
                let Some(raw) = tokens.get(pos + 2) else { continue };
                let raw = raw.trim_end_matches(';');
                match raw.split_once('[') {
                    Some((base, count)) => {
                        let count: usize = count.trim_end_matches(']').parse().unwrap_or(1);
                        for i in 0..count {
                            let name = format!("{}[{}]", base, i);
                            if !uniforms.contains_key(&name) {
                                uniforms.insert(name, UniformLocation(next_location));
                                next_location += 1;
                            }
                        }
                    }
                    None => {
                        if !uniforms.contains_key(raw) {
                            uniforms.insert(raw.to_string(), UniformLocation(next_location));
                            next_location += 1;
                        }
                    }
                }
            } else if line.starts_with("layout") && line.contains(") in ") {
                let location = line
                    .split_once('=')
                    .and_then(|(_, rest)| rest.split_once(')'))
                    .and_then(|(digits, _)| digits.trim().parse::<u32>().ok());
                let name = tokens.last().map(|t| t.trim_end_matches(';'));
                if let (Some(location), Some(name)) = (location, name) {
                    attributes.insert(name.to_string(), location);
                }
            }
        }
    }

    ProgramReflection::new(uniforms, blocks, attributes)
}

// ============================================================================
// Mock VertexArray
// ============================================================================

pub struct MockVertexArray {
    pub label: String,
    log: CommandLog,
    instance_buffer: Mutex<Option<Arc<dyn Buffer>>>,
}

impl VertexArray for MockVertexArray {
    fn label(&self) -> &str {
        &self.label
    }

    fn attach_instance_buffer(
        &self,
        buffer: &Arc<dyn Buffer>,
        layout: &[VertexAttribute],
        stride: u32,
        first_location: u32,
    ) -> Result<()> {
        *self.instance_buffer.lock().unwrap() = Some(Arc::clone(buffer));
        push(&self.log, format!(
            "attach_instance_buffer {} {} attributes={} stride={} first_location={}",
            self.label, buffer.label(), layout.len(), stride, first_location
        ));
        Ok(())
    }

    fn instance_buffer(&self) -> Option<Arc<dyn Buffer>> {
        self.instance_buffer.lock().unwrap().clone()
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

pub struct MockCommandList {
    log: CommandLog,
    current_program: Option<Arc<dyn ShaderProgram>>,
    viewport: Viewport,
    saved_viewport: Option<Viewport>,
    recording: bool,
}

impl MockCommandList {
    pub fn new(log: CommandLog) -> Self {
        Self {
            log,
            current_program: None,
            viewport: Viewport::default(),
            saved_viewport: None,
            recording: false,
        }
    }

    fn record(&self, line: String) -> Result<()> {
        if !self.recording {
            return Err(Error::BackendError(format!("'{}' recorded outside begin/end", line)));
        }
        push(&self.log, line);
        Ok(())
    }
}

fn clear_flags_name(flags: ClearFlags) -> String {
    let mut names = Vec::new();
    if flags.contains(ClearFlags::COLOR) {
        names.push("COLOR");
    }
    if flags.contains(ClearFlags::DEPTH) {
        names.push("DEPTH");
    }
    if flags.contains(ClearFlags::STENCIL) {
        names.push("STENCIL");
    }
    names.join("|")
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.recording = true;
        push(&self.log, "begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.record("end".to_string())?;
        self.recording = false;
        Ok(())
    }

    fn bind_framebuffer(&mut self, framebuffer: &Arc<dyn Framebuffer>, draw_buffers: DrawBuffers) -> Result<()> {
        self.saved_viewport = Some(self.viewport);
        self.viewport = Viewport::extent(framebuffer.width(), framebuffer.height());
        self.record(format!("bind_framebuffer {} {:?}", framebuffer.label(), draw_buffers))
    }

    fn set_draw_buffers(&mut self, draw_buffers: DrawBuffers) -> Result<()> {
        self.record(format!("set_draw_buffers {:?}", draw_buffers))
    }

    fn unbind_framebuffer(&mut self, restore_viewport: bool) -> Result<()> {
        if restore_viewport {
            if let Some(saved) = self.saved_viewport.take() {
                self.viewport = saved;
            }
        }
        self.record(format!("unbind_framebuffer {}", restore_viewport))
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.viewport = viewport;
        self.record(format!(
            "set_viewport {} {} {} {}",
            viewport.x, viewport.y, viewport.width, viewport.height
        ))
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) -> Result<()> {
        self.record(format!("clear {} {:?}", clear_flags_name(flags), color))
    }

    fn set_depth_test(&mut self, enabled: bool) -> Result<()> {
        self.record(format!("set_depth_test {}", enabled))
    }

    fn set_cull_mode(&mut self, mode: CullMode) -> Result<()> {
        self.record(format!("set_cull_mode {:?}", mode))
    }

    fn set_blend_state(&mut self, state: BlendState) -> Result<()> {
        self.record(format!("set_blend_state {:?}", state))
    }

    fn bind_program(&mut self, program: &Arc<dyn ShaderProgram>) -> Result<()> {
        self.current_program = Some(Arc::clone(program));
        self.record(format!("bind_program {}", program.label()))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()> {
        let name = self
            .current_program
            .as_ref()
            .and_then(|p| p.reflection().uniform_name(location).map(str::to_string))
            .unwrap_or_else(|| format!("<{}>", location.0));
        self.record(format!("set_uniform {} {:?}", name, value))
    }

    fn bind_uniform_block(
        &mut self,
        program: &Arc<dyn ShaderProgram>,
        block_index: u32,
        binding: u32,
        buffer: &Arc<dyn Buffer>,
    ) -> Result<()> {
        self.record(format!(
            "bind_uniform_block {} block={} binding={} {}",
            program.label(), block_index, binding, buffer.label()
        ))
    }

    fn bind_texture(&mut self, unit: u32, texture: &Arc<dyn Texture>) -> Result<()> {
        self.record(format!("bind_texture {} {}", unit, texture.label()))
    }

    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()> {
        self.record(format!("generate_mipmaps {}", texture.label()))
    }

    fn write_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()> {
        buffer.update(offset, data)?;
        self.record(format!("write_buffer {} offset={} bytes={}", buffer.label(), offset, data.len()))
    }

    fn reallocate_buffer(&mut self, buffer: &Arc<dyn Buffer>, data: &[u8]) -> Result<()> {
        buffer.allocate(data)?;
        self.record(format!("reallocate_buffer {} bytes={}", buffer.label(), data.len()))
    }

    fn draw_indexed(&mut self, vertex_array: &Arc<dyn VertexArray>, index_count: u32, instance_count: u32) -> Result<()> {
        let program = self
            .current_program
            .as_ref()
            .map(|p| p.label().to_string())
            .unwrap_or_else(|| "<none>".to_string());
        self.record(format!(
            "draw_indexed {} indices={} instances={} program={}",
            vertex_array.label(), index_count, instance_count, program
        ))
    }

    fn blit(
        &mut self,
        source: &Arc<dyn Framebuffer>,
        source_attachment: u32,
        source_rect: Rect2D,
        target: BlitTarget<'_>,
        target_rect: Rect2D,
        filter: TextureFilter,
    ) -> Result<()> {
        let target_name = match target {
            BlitTarget::Framebuffer { framebuffer, attachment } => {
                format!("{}[{}]", framebuffer.label(), attachment)
            }
            BlitTarget::Presentation => "presentation".to_string(),
        };
        self.record(format!(
            "blit {}[{}] {}x{} -> {} {}x{} {:?}",
            source.label(), source_attachment, source_rect.width, source_rect.height,
            target_name, target_rect.width, target_rect.height, filter
        ))
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that tracks created resources and records commands
pub struct MockGraphicsDevice {
    log: CommandLog,
    pub created_buffers: Arc<Mutex<Vec<String>>>,
    pub created_textures: Arc<Mutex<Vec<String>>>,
    pub created_framebuffers: Arc<Mutex<Vec<String>>>,
    pub created_programs: Arc<Mutex<Vec<String>>>,
    failing_programs: Vec<String>,
    failing_framebuffers: Vec<String>,
    submitted: u64,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            created_buffers: Arc::new(Mutex::new(Vec::new())),
            created_textures: Arc::new(Mutex::new(Vec::new())),
            created_framebuffers: Arc::new(Mutex::new(Vec::new())),
            created_programs: Arc::new(Mutex::new(Vec::new())),
            failing_programs: Vec::new(),
            failing_framebuffers: Vec::new(),
            submitted: 0,
        }
    }

    /// Make `create_shader_program` fail for programs labelled `label`
    pub fn fail_program(mut self, label: &str) -> Self {
        self.failing_programs.push(label.to_string());
        self
    }

    /// Make `create_framebuffer` fail for framebuffers labelled `label`
    pub fn fail_framebuffer(mut self, label: &str) -> Self {
        self.failing_framebuffers.push(label.to_string());
        self
    }

    /// Handle on the command log, usable after the device is moved
    pub fn command_log(&self) -> CommandLog {
        Arc::clone(&self.log)
    }

    pub fn get_created_framebuffers(&self) -> Vec<String> {
        self.created_framebuffers.lock().unwrap().clone()
    }

    pub fn get_created_programs(&self) -> Vec<String> {
        self.created_programs.lock().unwrap().clone()
    }
}

/// Snapshot of every recorded line
pub fn commands(log: &CommandLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Recorded lines starting with `prefix`
pub fn commands_with_prefix(log: &CommandLog, prefix: &str) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|line| line.starts_with(prefix))
        .cloned()
        .collect()
}

/// Index of the first line starting with `prefix` at or after `from`
pub fn position_from(log: &CommandLog, from: usize, prefix: &str) -> Option<usize> {
    log.lock()
        .unwrap()
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| line.starts_with(prefix))
        .map(|(i, _)| i)
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        self.created_buffers.lock().unwrap().push(desc.label.clone());
        Ok(Arc::new(MockBuffer::new(desc.label, desc.data.len() as u64)))
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        self.created_textures.lock().unwrap().push(desc.label.clone());
        let texture = MockTexture::new(desc.label, desc.width, desc.height, desc.format);
        if let Some(data) = &desc.data {
            texture.update(data)?;
        }
        Ok(Arc::new(texture))
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        if self.failing_framebuffers.contains(&desc.label)
            || desc.width == 0
            || desc.height == 0
            || (desc.color_attachments.is_empty() && desc.depth_attachment.is_none())
        {
            return Err(Error::IncompleteFramebuffer(desc.label.clone()));
        }

        let colors: Vec<Arc<dyn Texture>> = desc
            .color_attachments
            .iter()
            .enumerate()
            .map(|(i, attachment)| {
                Arc::new(MockTexture::new(
                    format!("{}.color{}", desc.label, i),
                    desc.width,
                    desc.height,
                    attachment.format,
                )) as Arc<dyn Texture>
            })
            .collect();

        let depth = match desc.depth_attachment {
            Some(DepthAttachmentDesc::Texture { format }) => Some(Arc::new(MockTexture::new(
                format!("{}.depth", desc.label),
                desc.width,
                desc.height,
                format,
            )) as Arc<dyn Texture>),
            _ => None,
        };

        self.created_framebuffers.lock().unwrap().push(format!(
            "{} {}x{} colors={}",
            desc.label, desc.width, desc.height, desc.color_attachments.len()
        ));

        Ok(Arc::new(MockFramebuffer {
            label: desc.label.clone(),
            width: desc.width,
            height: desc.height,
            colors,
            depth,
        }))
    }

    fn create_shader_program(&mut self, desc: &ShaderProgramDesc) -> Result<Arc<dyn ShaderProgram>> {
        let missing_stage = desc.source(ShaderStage::Vertex).is_none()
            || desc.source(ShaderStage::Fragment).is_none();
        let unexpanded = desc.sources.iter().any(|s| s.source.contains("[filter_code]"));
        if self.failing_programs.contains(&desc.label) || missing_stage || unexpanded {
            return Err(Error::ShaderCompilation {
                label: desc.label.clone(),
                log: "mock compile failure".to_string(),
            });
        }

        let sources: Vec<&str> = desc.sources.iter().map(|s| s.source.as_str()).collect();
        self.created_programs.lock().unwrap().push(desc.label.clone());
        Ok(Arc::new(MockShaderProgram {
            label: desc.label.clone(),
            reflection: reflect_sources(&sources),
        }))
    }

    fn create_vertex_array(&mut self, desc: VertexArrayDesc) -> Result<Arc<dyn VertexArray>> {
        Ok(Arc::new(MockVertexArray {
            label: desc.label,
            log: Arc::clone(&self.log),
            instance_buffer: Mutex::new(None),
        }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList::new(Arc::clone(&self.log))))
    }

    fn submit(&mut self, commands: &[&dyn CommandList]) -> Result<()> {
        self.submitted += commands.len() as u64;
        push(&self.log, format!("submit {}", commands.len()));
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            submitted_command_lists: self.submitted,
            framebuffers: self.created_framebuffers.lock().unwrap().len() as u32,
            shader_programs: self.created_programs.lock().unwrap().len() as u32,
        }
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
