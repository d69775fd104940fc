//! GLSL sources for the geometry, shadow, lighting and filter programs
//!
//! Uniform naming:
//! - `u*`: per-draw or per-pass values
//! - `t*`: material textures and flags
//! - `rt*`: render-target attachments sampled by full-screen passes

/// Geometry pass, one model matrix per draw
pub const GEOMETRY_VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 vPosition;
layout (location = 1) in vec3 vNormal;
layout (location = 2) in vec3 vTangent;
layout (location = 3) in vec2 vTexCoord;
layout (location = 11) in ivec4 vJointIds;
layout (location = 12) in vec4 vJointWeights;

uniform mat4 uModel;
uniform mat4 uView;
uniform mat4 uProjection;
uniform int uHasBones;

layout (std140) uniform Joints {
    mat4 uJoints[64];
};

out vec3 fPosition;
out vec3 fNormal;
out vec3 fTangent;
out vec2 fTexCoord;
out vec4 fColor;
out float fEmission;

mat4 skinMatrix() {
    if (uHasBones == 0) {
        return mat4(1.0);
    }
    return uJoints[vJointIds.x] * vJointWeights.x
         + uJoints[vJointIds.y] * vJointWeights.y
         + uJoints[vJointIds.z] * vJointWeights.z
         + uJoints[vJointIds.w] * vJointWeights.w;
}

void main() {
    mat4 model = uModel * skinMatrix();
    vec4 world = model * vec4(vPosition, 1.0);
    mat3 normalMatrix = transpose(inverse(mat3(model)));
    fPosition = world.xyz;
    fNormal = normalize(normalMatrix * vNormal);
    fTangent = normalize(normalMatrix * vTangent);
    fTexCoord = vTexCoord;
    fColor = vec4(1.0);
    fEmission = 0.0;
    gl_Position = uProjection * uView * world;
}
"#;

/// Geometry pass, per-instance model/texcoord/color/emission stream
pub const GEOMETRY_INSTANCED_VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 vPosition;
layout (location = 1) in vec3 vNormal;
layout (location = 2) in vec3 vTangent;
layout (location = 3) in vec2 vTexCoord;
layout (location = 4) in mat4 iModel;
layout (location = 8) in vec4 iTexCoordTransform;
layout (location = 9) in vec4 iColor;
layout (location = 10) in float iEmission;
layout (location = 11) in ivec4 vJointIds;
layout (location = 12) in vec4 vJointWeights;

uniform mat4 uView;
uniform mat4 uProjection;
uniform int uHasBones;

layout (std140) uniform Joints {
    mat4 uJoints[64];
};

out vec3 fPosition;
out vec3 fNormal;
out vec3 fTangent;
out vec2 fTexCoord;
out vec4 fColor;
out float fEmission;

mat4 skinMatrix() {
    if (uHasBones == 0) {
        return mat4(1.0);
    }
    return uJoints[vJointIds.x] * vJointWeights.x
         + uJoints[vJointIds.y] * vJointWeights.y
         + uJoints[vJointIds.z] * vJointWeights.z
         + uJoints[vJointIds.w] * vJointWeights.w;
}

void main() {
    mat4 model = iModel * skinMatrix();
    vec4 world = model * vec4(vPosition, 1.0);
    mat3 normalMatrix = transpose(inverse(mat3(model)));
    fPosition = world.xyz;
    fNormal = normalize(normalMatrix * vNormal);
    fTangent = normalize(normalMatrix * vTangent);
    fTexCoord = iTexCoordTransform.xy + vTexCoord * iTexCoordTransform.zw;
    fColor = iColor;
    fEmission = iEmission;
    gl_Position = uProjection * uView * world;
}
"#;

/// G-buffer fill: diffuse+alpha, material, normal, position
pub const GBUFFER_FRAGMENT: &str = r#"#version 330 core
in vec3 fPosition;
in vec3 fNormal;
in vec3 fTangent;
in vec2 fTexCoord;
in vec4 fColor;
in float fEmission;

uniform sampler2D tDiffuse;
uniform sampler2D tSpecular;
uniform sampler2D tNormals;
uniform sampler2D tEmission;
uniform int tTextureValid[4];

layout (std140) uniform Material {
    float shininess;
    float emission;
    vec2 pad;
    vec4 diffuse;
} uMaterial;

layout (location = 0) out vec4 gDiffuse;
layout (location = 1) out vec3 gMaterial;
layout (location = 2) out vec3 gNormal;
layout (location = 3) out vec3 gPosition;

void main() {
    vec4 diffuse = uMaterial.diffuse * fColor;
    if (tTextureValid[0] != 0) {
        diffuse *= texture(tDiffuse, fTexCoord);
    }
    if (diffuse.a < 0.01) {
        discard;
    }

    float specular = 1.0;
    if (tTextureValid[1] != 0) {
        specular = texture(tSpecular, fTexCoord).r;
    }

    vec3 normal = normalize(fNormal);
    if (tTextureValid[2] != 0) {
        vec3 tangent = normalize(fTangent - dot(fTangent, normal) * normal);
        mat3 tbn = mat3(tangent, cross(normal, tangent), normal);
        normal = normalize(tbn * (texture(tNormals, fTexCoord).xyz * 2.0 - 1.0));
    }

    float emission = uMaterial.emission + fEmission;
    if (tTextureValid[3] != 0) {
        emission *= texture(tEmission, fTexCoord).r;
    }

    gDiffuse = diffuse;
    gMaterial = vec3(specular, uMaterial.shininess, emission);
    gNormal = normal;
    gPosition = fPosition;
}
"#;

/// Depth-only shadow pass, one model matrix per draw
pub const SHADOW_VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 vPosition;
layout (location = 11) in ivec4 vJointIds;
layout (location = 12) in vec4 vJointWeights;

uniform mat4 uModel;
uniform mat4 uView;
uniform mat4 uProjection;
uniform int uHasBones;

layout (std140) uniform Joints {
    mat4 uJoints[64];
};

mat4 skinMatrix() {
    if (uHasBones == 0) {
        return mat4(1.0);
    }
    return uJoints[vJointIds.x] * vJointWeights.x
         + uJoints[vJointIds.y] * vJointWeights.y
         + uJoints[vJointIds.z] * vJointWeights.z
         + uJoints[vJointIds.w] * vJointWeights.w;
}

void main() {
    gl_Position = uProjection * uView * uModel * skinMatrix() * vec4(vPosition, 1.0);
}
"#;

/// Depth-only shadow pass, per-instance model matrices
pub const SHADOW_INSTANCED_VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 vPosition;
layout (location = 4) in mat4 iModel;
layout (location = 11) in ivec4 vJointIds;
layout (location = 12) in vec4 vJointWeights;

uniform mat4 uView;
uniform mat4 uProjection;
uniform int uHasBones;

layout (std140) uniform Joints {
    mat4 uJoints[64];
};

mat4 skinMatrix() {
    if (uHasBones == 0) {
        return mat4(1.0);
    }
    return uJoints[vJointIds.x] * vJointWeights.x
         + uJoints[vJointIds.y] * vJointWeights.y
         + uJoints[vJointIds.z] * vJointWeights.z
         + uJoints[vJointIds.w] * vJointWeights.w;
}

void main() {
    gl_Position = uProjection * uView * iModel * skinMatrix() * vec4(vPosition, 1.0);
}
"#;

pub const SHADOW_FRAGMENT: &str = r#"#version 330 core
void main() {
}
"#;

/// Full-screen quad over [0,1]²
pub const QUAD_VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 vPosition;

out vec2 uTexCoord;

void main() {
    uTexCoord = vPosition.xy;
    gl_Position = vec4(vPosition * 2.0 - 1.0, 1.0);
}
"#;

/// Ambient term: ambient color times diffuse, plus emission
pub const AMBIENT_FRAGMENT: &str = r#"#version 330 core
in vec2 uTexCoord;

uniform sampler2D rtDiffuse;
uniform sampler2D rtMaterial;
uniform vec3 uAmbientColor;

out vec4 color;

void main() {
    vec4 diffuse = texture(rtDiffuse, uTexCoord);
    float emission = texture(rtMaterial, uTexCoord).b;
    color = vec4(diffuse.rgb * (uAmbientColor + vec3(emission)), diffuse.a);
}
"#;

/// One light over the G-buffer, optionally shadowed
pub const LIGHTING_FRAGMENT: &str = r#"#version 330 core
in vec2 uTexCoord;

uniform sampler2D rtDiffuse;
uniform sampler2D rtMaterial;
uniform sampler2D rtNormals;
uniform sampler2D rtPosition;
uniform sampler2D rtShadow;
uniform int rtShadowEnabled;

uniform mat4 uView;
uniform mat4 uLightViewProj;
uniform vec2 uNF;

uniform int uLightType;
uniform vec3 uLightPosition;
uniform vec3 uLightDirection;
uniform float uLightRadius;
uniform float uLightCutOff;
uniform vec4 uLightColorIntensity;

out vec4 color;

float shadowFactor(vec3 position, vec3 normal, vec3 toLight) {
    if (rtShadowEnabled == 0) {
        return 1.0;
    }
    vec4 lightSpace = uLightViewProj * vec4(position, 1.0);
    vec3 coords = lightSpace.xyz / lightSpace.w * 0.5 + 0.5;
    if (coords.z > 1.0) {
        return 1.0;
    }
    float bias = max(0.002 * (1.0 - dot(normal, toLight)), 0.0005);
    vec2 texel = 1.0 / vec2(textureSize(rtShadow, 0));
    float lit = 0.0;
    for (int x = -1; x <= 1; ++x) {
        for (int y = -1; y <= 1; ++y) {
            float depth = texture(rtShadow, coords.xy + vec2(x, y) * texel).r;
            lit += coords.z - bias > depth ? 0.0 : 1.0;
        }
    }
    return lit / 9.0;
}

void main() {
    vec4 diffuse = texture(rtDiffuse, uTexCoord);
    vec3 storedNormal = texture(rtNormals, uTexCoord).xyz;
    // empty pixels keep the cleared zero normal
    if (diffuse.a == 0.0 || dot(storedNormal, storedNormal) < 1e-8) {
        discard;
    }
    vec3 material = texture(rtMaterial, uTexCoord).rgb;
    vec3 normal = normalize(storedNormal);
    vec3 position = texture(rtPosition, uTexCoord).xyz;
    vec3 eye = inverse(uView)[3].xyz;

    vec3 toLight;
    float attenuation = 1.0;
    if (uLightType == 1) {
        toLight = normalize(-uLightDirection);
    } else {
        vec3 delta = uLightPosition - position;
        float distance = length(delta);
        toLight = delta / max(distance, 0.0001);
        attenuation = clamp(1.0 - distance / uLightRadius, 0.0, 1.0);
        attenuation *= attenuation;
        if (uLightType == 3) {
            float theta = dot(toLight, normalize(-uLightDirection));
            float outer = cos(uLightCutOff);
            float inner = cos(uLightCutOff * 0.9);
            attenuation *= clamp((theta - outer) / max(inner - outer, 0.0001), 0.0, 1.0);
        }
    }

    float lambert = max(dot(normal, toLight), 0.0);
    vec3 toEye = eye - position;
    vec3 view = toEye / max(length(toEye), 0.0001);
    vec3 halfway = toLight + view;
    halfway /= max(length(halfway), 0.0001);
    float shininess = max(material.g * 128.0, 1.0);
    float specular = material.r * pow(max(dot(normal, halfway), 0.0), shininess);

    float shadow = shadowFactor(position, normal, toLight);
    vec3 light = uLightColorIntensity.rgb * uLightColorIntensity.a * attenuation * shadow;
    color = vec4(light * (diffuse.rgb * lambert + vec3(specular)), 1.0);
}
"#;
