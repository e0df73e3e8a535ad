/// CommandBuffer - relocatable stream of command packets
///
/// Recording does not need an RHI: commands are appended as packets and
/// dispatched later, in insertion order, against any RHI.
///
/// Packet layout (tightly packed, read unaligned):
///
/// ```text
/// | PacketHeader | command payload (Pod) | auxiliary bytes |
/// ```
///
/// The header stores the dispatch function index, the payload and auxiliary
/// sizes, the byte offset of the next packet (`NO_NEXT_PACKET` for the last
/// one) and the range of the resource table the packet references. Resources
/// are not serialized into the payload; the packet refers to them by slot
/// (0, 1, ..) inside its own range, which keeps packets relocatable when a
/// command buffer is appended into another one.

use std::sync::Arc;
use bytemuck::{NoUninit, Pod, Zeroable};
use crate::rhi::{Rhi, ResourceHandle, CommandDispatchFunctionIndex, DISPATCH_FUNCTIONS};

/// Sentinel for "no next packet"
pub const NO_NEXT_PACKET: u32 = u32::MAX;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct PacketHeader {
    next_packet_offset: u32,
    dispatch_function_index: u32,
    command_size: u32,
    auxiliary_size: u32,
    first_resource: u32,
    number_of_resources: u32,
}

const PACKET_HEADER_SIZE: usize = std::mem::size_of::<PacketHeader>();

/// Entry of the resource table
#[derive(Clone)]
enum PacketResource {
    Resource(ResourceHandle),
    CommandBuffer(Arc<CommandBuffer>),
}

/// Append-only command buffer
///
/// Recording is single-threaded per command buffer. A command buffer is
/// cleared and refilled every frame by its owner.
#[derive(Clone, Default)]
pub struct CommandBuffer {
    bytes: Vec<u8>,
    last_packet_offset: Option<usize>,
    number_of_commands: u32,
    resources: Vec<PacketResource>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_commands == 0
    }

    pub fn number_of_commands(&self) -> u32 {
        self.number_of_commands
    }

    /// Size of the recorded packet stream in bytes
    pub fn number_of_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Number of resource references held by the recorded packets
    pub fn number_of_resource_references(&self) -> usize {
        self.resources.len()
    }

    /// Remove all packets and release all resource references
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.resources.clear();
        self.last_packet_offset = None;
        self.number_of_commands = 0;
    }

    // ===== RECORDING =====

    /// Append a packet
    ///
    /// # Arguments
    ///
    /// * `dispatch_function_index` - Handler invoked at dispatch time
    /// * `command` - Fixed-size payload
    /// * `resources` - Resources the packet references, addressed by slot
    pub fn add_command<C: NoUninit>(
        &mut self,
        dispatch_function_index: CommandDispatchFunctionIndex,
        command: &C,
        resources: impl IntoIterator<Item = ResourceHandle>,
    ) {
        self.add_command_with_aux(dispatch_function_index, command, resources, &[]);
    }

    /// Append a packet followed by auxiliary bytes (inline arrays, names)
    pub fn add_command_with_aux<C: NoUninit>(
        &mut self,
        dispatch_function_index: CommandDispatchFunctionIndex,
        command: &C,
        resources: impl IntoIterator<Item = ResourceHandle>,
        auxiliary: &[u8],
    ) {
        let first_resource = self.resources.len();
        self.resources.extend(resources.into_iter().map(PacketResource::Resource));
        self.push_packet(
            dispatch_function_index as u32,
            bytemuck::bytes_of(command),
            auxiliary,
            first_resource,
        );
    }

    /// Append a packet referencing another command buffer
    pub(crate) fn add_command_buffer_command(
        &mut self,
        dispatch_function_index: CommandDispatchFunctionIndex,
        command_buffer: Arc<CommandBuffer>,
    ) {
        let first_resource = self.resources.len();
        self.resources.push(PacketResource::CommandBuffer(command_buffer));
        self.push_packet(dispatch_function_index as u32, &[], &[], first_resource);
    }

    fn push_packet(&mut self, dispatch_function_index: u32, command: &[u8], auxiliary: &[u8], first_resource: usize) {
        let offset = self.bytes.len();
        let header = PacketHeader {
            next_packet_offset: NO_NEXT_PACKET,
            dispatch_function_index,
            command_size: command.len() as u32,
            auxiliary_size: auxiliary.len() as u32,
            first_resource: first_resource as u32,
            number_of_resources: (self.resources.len() - first_resource) as u32,
        };
        self.bytes.reserve(PACKET_HEADER_SIZE + command.len() + auxiliary.len());
        self.bytes.extend_from_slice(bytemuck::bytes_of(&header));
        self.bytes.extend_from_slice(command);
        self.bytes.extend_from_slice(auxiliary);

        // Link the previous packet to this one
        if let Some(previous) = self.last_packet_offset {
            self.bytes[previous..previous + 4].copy_from_slice(&(offset as u32).to_ne_bytes());
        }
        self.last_packet_offset = Some(offset);
        self.number_of_commands += 1;
    }

    // ===== DISPATCH =====

    /// Iterate over the recorded packets in insertion order
    pub fn packets(&self) -> CommandPackets<'_> {
        CommandPackets {
            command_buffer: self,
            offset: if self.bytes.is_empty() { None } else { Some(0) },
        }
    }

    /// Invoke the backend handler of every packet, in insertion order
    ///
    /// The command buffer must not be empty.
    pub fn dispatch_to_rhi(&self, rhi: &mut dyn Rhi) {
        debug_assert!(!self.is_empty(), "Can't dispatch an empty command buffer");
        for packet in self.packets() {
            match DISPATCH_FUNCTIONS.get(packet.dispatch_function_index as usize) {
                Some(dispatch_function) => dispatch_function(&packet, rhi),
                None => debug_assert!(false, "Invalid dispatch function index {}", packet.dispatch_function_index),
            }
        }
    }

    /// Hand the command buffer to the RHI for execution
    pub fn submit_to_rhi(&self, rhi: &mut dyn Rhi) {
        rhi.submit_command_buffer(self);
    }

    pub fn submit_to_rhi_and_clear(&mut self, rhi: &mut dyn Rhi) {
        rhi.submit_command_buffer(self);
        self.clear();
    }

    /// Append copies of all packets (and their resource references) to another command buffer
    pub fn submit_to_command_buffer(&self, target: &mut CommandBuffer) {
        for packet in self.packets() {
            let first_resource = target.resources.len();
            target.resources.extend(packet.resources.iter().cloned());
            target.push_packet(packet.dispatch_function_index, packet.command, packet.auxiliary, first_resource);
        }
    }

    pub fn submit_to_command_buffer_and_clear(&mut self, target: &mut CommandBuffer) {
        self.submit_to_command_buffer(target);
        self.clear();
    }
}

impl std::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("number_of_commands", &self.number_of_commands)
            .field("number_of_bytes", &self.bytes.len())
            .field("number_of_resource_references", &self.resources.len())
            .finish()
    }
}

// ============================================================================
// Packet view
// ============================================================================

/// Borrowed view of one recorded packet
pub struct CommandPacket<'a> {
    dispatch_function_index: u32,
    command: &'a [u8],
    auxiliary: &'a [u8],
    resources: &'a [PacketResource],
}

impl<'a> CommandPacket<'a> {
    /// Dispatch function of this packet, `None` if the index is unknown
    pub fn dispatch_function_index(&self) -> Option<CommandDispatchFunctionIndex> {
        CommandDispatchFunctionIndex::from_u32(self.dispatch_function_index)
    }

    /// Read the fixed-size payload
    pub fn command<C: Pod>(&self) -> C {
        debug_assert_eq!(self.command.len(), std::mem::size_of::<C>(), "Command payload size mismatch");
        bytemuck::pod_read_unaligned(&self.command[..std::mem::size_of::<C>()])
    }

    /// Raw auxiliary bytes
    pub fn auxiliary(&self) -> &'a [u8] {
        self.auxiliary
    }

    /// Read the auxiliary bytes as an array of `T`
    pub fn auxiliary_elements<T: Pod>(&self) -> Vec<T> {
        self.auxiliary
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    pub fn number_of_resources(&self) -> usize {
        self.resources.len()
    }

    /// Resource referenced at `slot`, `None` if absent or not a GPU resource
    pub fn resource(&self, slot: usize) -> Option<&'a ResourceHandle> {
        match self.resources.get(slot) {
            Some(PacketResource::Resource(resource)) => Some(resource),
            _ => None,
        }
    }

    /// Command buffer referenced at `slot`
    pub fn command_buffer(&self, slot: usize) -> Option<&'a Arc<CommandBuffer>> {
        match self.resources.get(slot) {
            Some(PacketResource::CommandBuffer(command_buffer)) => Some(command_buffer),
            _ => None,
        }
    }
}

/// Iterator over the packets of a command buffer
pub struct CommandPackets<'a> {
    command_buffer: &'a CommandBuffer,
    offset: Option<usize>,
}

impl<'a> Iterator for CommandPackets<'a> {
    type Item = CommandPacket<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset?;
        let bytes = &self.command_buffer.bytes;
        let header: PacketHeader = bytemuck::pod_read_unaligned(&bytes[offset..offset + PACKET_HEADER_SIZE]);

        let command_start = offset + PACKET_HEADER_SIZE;
        let auxiliary_start = command_start + header.command_size as usize;
        let auxiliary_end = auxiliary_start + header.auxiliary_size as usize;
        let first_resource = header.first_resource as usize;
        let resources_end = first_resource + header.number_of_resources as usize;

        self.offset = if header.next_packet_offset == NO_NEXT_PACKET {
            None
        } else {
            Some(header.next_packet_offset as usize)
        };

        Some(CommandPacket {
            dispatch_function_index: header.dispatch_function_index,
            command: &bytes[command_start..auxiliary_start],
            auxiliary: &bytes[auxiliary_start..auxiliary_end],
            resources: &self.command_buffer.resources[first_resource..resources_end],
        })
    }
}

#[cfg(test)]
#[path = "command_buffer_tests.rs"]
mod tests;
